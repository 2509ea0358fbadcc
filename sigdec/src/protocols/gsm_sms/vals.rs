use crate::{vals, Dispatch, ValueStrings};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Dispatch)]
pub enum InformationElement {
    #[sigdec(code = 0x00, rename = "Concatenated Short Messages, 8-bit reference")]
    Concat8,
    #[sigdec(code = 0x01, rename = "Special SMS Message Indication")]
    SpecialIndication,
    #[sigdec(code = 0x04, rename = "Application Port Addressing, 8-bit")]
    Ports8,
    #[sigdec(code = 0x05, rename = "Application Port Addressing, 16-bit")]
    Ports16,
    #[sigdec(code = 0x08, rename = "Concatenated Short Messages, 16-bit reference")]
    Concat16,
    #[sigdec(code = 0x24, rename = "National Language Single Shift")]
    SingleShift,
    #[sigdec(code = 0x25, rename = "National Language Locking Shift")]
    LockingShift,
    #[sigdec(fallback, rename = "Information Element")]
    Other,
}

pub(super) const MTI_DOWNLINK: ValueStrings = vals! {
    0 => "SMS-DELIVER",
    1 => "SMS-SUBMIT-REPORT",
    2 => "SMS-STATUS-REPORT",
    3 => "Reserved",
};

pub(super) const MTI_UPLINK: ValueStrings = vals! {
    0 => "SMS-DELIVER-REPORT",
    1 => "SMS-SUBMIT",
    2 => "SMS-COMMAND",
    3 => "Reserved",
};

pub(super) const TYPES_OF_NUMBER: ValueStrings = vals! {
    0 => "Unknown",
    1 => "International",
    2 => "National",
    3 => "Network specific",
    4 => "Subscriber",
    5 => "Alphanumeric",
    6 => "Abbreviated",
    7 => "Reserved for extension",
};

pub(super) const NUMBERING_PLANS: ValueStrings = vals! {
    0 => "Unknown",
    1 => "ISDN/telephone (E.164/E.163)",
    3 => "Data (X.121)",
    4 => "Telex",
    5 => "Service Centre Specific plan",
    6 => "Service Centre Specific plan",
    8 => "National",
    9 => "Private",
    10 => "ERMES (ETSI DE/PS 3 01-3)",
    15 => "Reserved for extension",
};

pub(super) const PROTOCOL_IDS: ValueStrings = vals! {
    0x00 => "Default store and forward short message",
    0x40 => "Short Message Type 0",
    0x41 => "Replace Short Message Type 1",
    0x42 => "Replace Short Message Type 2",
    0x43 => "Replace Short Message Type 3",
    0x44 => "Replace Short Message Type 4",
    0x45 => "Replace Short Message Type 5",
    0x46 => "Replace Short Message Type 6",
    0x47 => "Replace Short Message Type 7",
    0x5E => "Enhanced Message Service (Obsolete)",
    0x5F => "Return Call Message",
    0x7C => "ANSI-136 R-DATA",
    0x7D => "ME Data download",
    0x7E => "ME De-personalization Short Message",
    0x7F => "(U)SIM Data download",
};

pub(super) const GENERAL_CODING_GROUPS: ValueStrings = vals! {
    0 => "General Data Coding indication",
    1 => "Message Marked for Automatic Deletion",
};

pub(super) const CODING_GROUPS: ValueStrings = vals! {
    0xC => "Message Waiting Indication, Discard Message",
    0xD => "Message Waiting Indication, Store Message",
    0xE => "Message Waiting Indication, Store Message (UCS2)",
    0xF => "Data coding/message class",
};

pub(super) const ALPHABETS: ValueStrings = vals! {
    0 => "GSM 7 bit default alphabet",
    1 => "8 bit data",
    2 => "UCS2 (16 bit)",
    3 => "Reserved",
};

pub(super) const MESSAGE_CLASSES: ValueStrings = vals! {
    0 => "Class 0",
    1 => "Class 1, ME-specific",
    2 => "Class 2, (U)SIM-specific",
    3 => "Class 3, TE-specific",
};

pub(super) const INDICATION_TYPES: ValueStrings = vals! {
    0 => "Voicemail Message Waiting",
    1 => "Fax Message Waiting",
    2 => "Electronic Mail Message Waiting",
    3 => "Other Message Waiting",
};

pub(super) const VP_FORMATS: ValueStrings = vals! {
    0 => "TP-VP field not present",
    1 => "TP-VP field present - enhanced format",
    2 => "TP-VP field present - relative format",
    3 => "TP-VP field present - absolute format",
};

pub(super) const ENHANCED_VP_FORMATS: ValueStrings = vals! {
    0 => "No Validity Period specified",
    1 => "Relative",
    2 => "Relative, integer seconds",
    3 => "Relative, semi-octet HH:MM:SS",
};

pub(super) const STATUSES: ValueStrings = vals! {
    0x00 => "Short message received by the SME",
    0x01 => "Short message forwarded by the SC to the SME but the SC is unable to confirm delivery",
    0x02 => "Short message replaced by the SC",
    0x20 => "Congestion, still trying",
    0x21 => "SME busy, still trying",
    0x22 => "No response from SME, still trying",
    0x23 => "Service rejected, still trying",
    0x24 => "Quality of service not available, still trying",
    0x25 => "Error in SME, still trying",
    0x40 => "Remote procedure error",
    0x41 => "Incompatible destination",
    0x42 => "Connection rejected by SME",
    0x43 => "Not obtainable",
    0x44 => "Quality of service not available",
    0x45 => "No interworking available",
    0x46 => "SM Validity Period Expired",
    0x47 => "SM Deleted by originating SME",
    0x48 => "SM Deleted by SC Administration",
    0x49 => "SM does not exist",
    0x60 => "Congestion",
    0x61 => "SME busy",
    0x62 => "No response from SME",
    0x63 => "Service rejected",
    0x64 => "Quality of service not available",
    0x65 => "Error in SME",
};

pub(super) const FAILURE_CAUSES: ValueStrings = vals! {
    0x80 => "Telematic interworking not supported",
    0x81 => "Short message Type 0 not supported",
    0x82 => "Cannot replace short message",
    0x8F => "Unspecified TP-PID error",
    0x90 => "Data coding scheme (alphabet) not supported",
    0x91 => "Message class not supported",
    0x9F => "Unspecified TP-DCS error",
    0xA0 => "Command cannot be actioned",
    0xA1 => "Command unsupported",
    0xAF => "Unspecified TP-Command error",
    0xB0 => "TPDU not supported",
    0xC0 => "SC busy",
    0xC1 => "No SC subscription",
    0xC2 => "SC system failure",
    0xC3 => "Invalid SME address",
    0xC4 => "Destination SME barred",
    0xC5 => "SM Rejected-Duplicate SM",
    0xC6 => "TP-VPF not supported",
    0xC7 => "TP-VP not supported",
    0xD0 => "(U)SIM SMS storage full",
    0xD1 => "No SMS storage capability in (U)SIM",
    0xD2 => "Error in MS",
    0xD3 => "Memory Capacity Exceeded",
    0xD4 => "(U)SIM Application Toolkit Busy",
    0xD5 => "(U)SIM data download error",
    0xFF => "Unspecified error cause",
};

pub(super) const COMMAND_TYPES: ValueStrings = vals! {
    0 => "Enquiry relating to previously submitted short message",
    1 => "Cancel Status Report Request relating to previously submitted short message",
    2 => "Delete previously submitted Short Message",
    3 => "Enable Status Report Request relating to previously submitted short message",
};

pub(super) const SPECIAL_INDICATIONS: ValueStrings = vals! {
    0 => "Voice Message Waiting",
    1 => "Fax Message Waiting",
    2 => "Electronic Mail Message Waiting",
    3 => "Other Message Waiting",
};
