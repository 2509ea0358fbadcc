use crate::{vals, Dispatch, SccpVariant, ValueStrings};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Dispatch)]
pub enum SccpMessage {
    #[sigdec(code = 0x01, rename = "Connection Request")]
    Cr,
    #[sigdec(code = 0x02, rename = "Connection Confirm")]
    Cc,
    #[sigdec(code = 0x03, rename = "Connection Refused")]
    Cref,
    #[sigdec(code = 0x04, rename = "Released")]
    Rlsd,
    #[sigdec(code = 0x05, rename = "Release Complete")]
    Rlc,
    #[sigdec(code = 0x06, rename = "Data Form 1")]
    Dt1,
    #[sigdec(code = 0x07, rename = "Data Form 2")]
    Dt2,
    #[sigdec(code = 0x08, rename = "Data Acknowledgement")]
    Ak,
    #[sigdec(code = 0x09, rename = "Unitdata")]
    Udt,
    #[sigdec(code = 0x0a, rename = "Unitdata Service")]
    Udts,
    #[sigdec(code = 0x0b, rename = "Expedited Data")]
    Ed,
    #[sigdec(code = 0x0c, rename = "Expedited Data Acknowledgement")]
    Ea,
    #[sigdec(code = 0x0d, rename = "Reset Request")]
    Rsr,
    #[sigdec(code = 0x0e, rename = "Reset Confirm")]
    Rsc,
    #[sigdec(code = 0x0f, rename = "Protocol Data Unit Error")]
    Err,
    #[sigdec(code = 0x10, rename = "Inactivity Test")]
    It,
    #[sigdec(code = 0x11, rename = "Extended Unitdata")]
    Xudt,
    #[sigdec(code = 0x12, rename = "Extended Unitdata Service")]
    Xudts,
    #[sigdec(code = 0x13, rename = "Long Unitdata")]
    Ludt,
    #[sigdec(code = 0x14, rename = "Long Unitdata Service")]
    Ludts,
    #[sigdec(fallback, rename = "Unknown Message")]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Dispatch)]
pub enum Parameter {
    #[sigdec(code = 0x00)]
    EndOfOptionalParameters,
    #[sigdec(code = 0x01)]
    DestinationLocalReference,
    #[sigdec(code = 0x02)]
    SourceLocalReference,
    #[sigdec(code = 0x03)]
    CalledPartyAddress,
    #[sigdec(code = 0x04)]
    CallingPartyAddress,
    #[sigdec(code = 0x05)]
    ProtocolClass,
    #[sigdec(code = 0x06, rename = "Segmenting/Reassembling")]
    SegmentingReassembling,
    #[sigdec(code = 0x07)]
    ReceiveSequenceNumber,
    #[sigdec(code = 0x08, rename = "Sequencing/Segmenting")]
    SequencingSegmenting,
    #[sigdec(code = 0x09)]
    Credit,
    #[sigdec(code = 0x0a)]
    ReleaseCause,
    #[sigdec(code = 0x0b)]
    ReturnCause,
    #[sigdec(code = 0x0c)]
    ResetCause,
    #[sigdec(code = 0x0d)]
    ErrorCause,
    #[sigdec(code = 0x0e)]
    RefusalCause,
    #[sigdec(code = 0x0f)]
    Data,
    #[sigdec(code = 0x10)]
    Segmentation,
    #[sigdec(code = 0x11)]
    HopCounter,
    #[sigdec(code = 0x12)]
    Importance,
    #[sigdec(code = 0x13)]
    LongData,
    #[sigdec(fallback, rename = "Unknown Parameter")]
    Unknown,
}

impl Parameter {
    /// Wire length of the parameter where it appears in a fixed part.
    pub(super) fn fixed_len(&self) -> usize {
        match self {
            Parameter::DestinationLocalReference
            | Parameter::SourceLocalReference
            | Parameter::Segmentation => 3,
            Parameter::SequencingSegmenting => 2,
            _ => 1,
        }
    }

    pub(super) fn pointer_name(&self) -> &'static str {
        match self {
            Parameter::CalledPartyAddress => "Pointer to Called Party Address",
            Parameter::CallingPartyAddress => "Pointer to Calling Party Address",
            Parameter::LongData => "Pointer to Long Data",
            _ => "Pointer to Data",
        }
    }
}

pub(super) const MESSAGE_HANDLING: ValueStrings = vals! {
    0x0 => "No special options",
    0x8 => "Return message on error",
};

pub(super) const ROUTING_INDICATORS: (&str, &str) = ("Route on SSN", "Route on GT");

pub(super) const ITU_GTI: ValueStrings = vals! {
    0x0 => "No Global Title",
    0x1 => "Nature of Address Indicator only",
    0x2 => "Translation Type only",
    0x3 => "Translation Type, Numbering Plan and Encoding Scheme included",
    0x4 => "Translation Type, Numbering Plan, Encoding Scheme and Nature of Address Indicator included",
};

pub(super) const ANSI_GTI: ValueStrings = vals! {
    0x0 => "No Global Title",
    0x1 => "Translation Type, Numbering Plan and Encoding Scheme included",
    0x2 => "Translation Type only",
};

pub(super) fn gti_values(variant: SccpVariant) -> ValueStrings {
    match variant {
        SccpVariant::Itu => ITU_GTI,
        SccpVariant::Ansi => ANSI_GTI,
    }
}

pub(super) const SUBSYSTEMS: ValueStrings = vals! {
    0 => "SSN not known/not used",
    1 => "SCCP management",
    3 => "ISDN User Part",
    4 => "OMAP (Operation, Maintenance and Administration Part)",
    5 => "MAP (Mobile Application Part)",
    6 => "HLR (Home Location Register)",
    7 => "VLR (Visitor Location Register)",
    8 => "MSC (Mobile Switching Center)",
    9 => "EIC/EIR (Equipment Identifier Center/Equipment Identification Register)",
    10 => "AUC/AC (Authentication Center)",
    11 => "ISDN supplementary services",
    13 => "Broadband ISDN edge-to-edge applications",
    14 => "TC test responder",
    142 => "RANAP",
    143 => "RNSAP",
    145 => "GMLC (MAP)",
    146 => "CAP (Camel Application Part)",
    147 => "gsmSCF (MAP) or IM-SSF (MAP) or Presence Network Agent",
    148 => "SIWF (MAP)",
    149 => "SGSN (MAP)",
    150 => "GGSN (MAP)",
    249 => "PCAP",
    250 => "BSC (BSSAP-LE)",
    251 => "MSC (BSSAP-LE)",
    252 => "IOS or SMLC (BSSAP-LE)",
    253 => "BSS O&M (A interface)",
    254 => "BSSAP/BSAP",
};

pub(super) const NATURE_OF_ADDRESS: ValueStrings = vals! {
    0 => "Unknown",
    1 => "Subscriber number",
    2 => "Reserved for national use",
    3 => "National significant number",
    4 => "International number",
};

pub(super) const NUMBERING_PLANS: ValueStrings = vals! {
    0 => "Unknown",
    1 => "ISDN/telephony (E.164/E.163)",
    2 => "Generic",
    3 => "Data (X.121)",
    4 => "Telex (F.69)",
    5 => "Maritime mobile (E.210, E.211)",
    6 => "Land mobile (E.212)",
    7 => "ISDN/mobile (E.214)",
    14 => "Private network or network-specific",
};

pub(super) const ENCODING_SCHEMES: ValueStrings = vals! {
    0 => "Unknown",
    1 => "BCD, odd number of digits",
    2 => "BCD, even number of digits",
    3 => "National specific",
};

pub(super) const RELEASE_CAUSES: ValueStrings = vals! {
    0x00 => "End user originated",
    0x01 => "End user congestion",
    0x02 => "End user failure",
    0x03 => "SCCP user originated",
    0x04 => "Remote procedure error",
    0x05 => "Inconsistent connection data",
    0x06 => "Access failure",
    0x07 => "Access congestion",
    0x08 => "Subsystem failure",
    0x09 => "Subsystem congestion",
    0x0a => "MTP failure",
    0x0b => "Network congestion",
    0x0c => "Expiration of reset timer",
    0x0d => "Expiration of receive inactivity timer",
    0x0f => "Unqualified",
    0x10 => "SCCP failure",
};

pub(super) const RETURN_CAUSES: ValueStrings = vals! {
    0x00 => "No translation for an address of such nature",
    0x01 => "No translation for this specific address",
    0x02 => "Subsystem congestion",
    0x03 => "Subsystem failure",
    0x04 => "Unequipped failure",
    0x05 => "MTP failure",
    0x06 => "Network congestion",
    0x07 => "Unqualified",
    0x08 => "Error in message transport",
    0x09 => "Error in local processing",
    0x0a => "Destination cannot perform reassembly",
    0x0b => "SCCP failure",
    0x0c => "Hop counter violation",
    0x0d => "Segmentation not supported",
    0x0e => "Segmentation failure",
};

pub(super) const RESET_CAUSES: ValueStrings = vals! {
    0x00 => "End user originated",
    0x01 => "SCCP user originated",
    0x02 => "Message out of order - incorrect send sequence number",
    0x03 => "Message out of order - incorrect receive sequence number",
    0x04 => "Remote procedure error - message out of window",
    0x05 => "Remote procedure error - incorrect send sequence number after (re)initialization",
    0x06 => "Remote procedure error - general",
    0x07 => "Remote end user operational",
    0x08 => "Network operational",
    0x09 => "Access operational",
    0x0a => "Network congestion",
    0x0c => "Unqualified",
};

pub(super) const ERROR_CAUSES: ValueStrings = vals! {
    0x00 => "Local Reference Number (LRN) mismatch - unassigned destination LRN",
    0x01 => "Local Reference Number (LRN) mismatch - inconsistent source LRN",
    0x02 => "Point code mismatch",
    0x03 => "Service class mismatch",
    0x04 => "Unqualified",
};

pub(super) const REFUSAL_CAUSES: ValueStrings = vals! {
    0x00 => "End user originated",
    0x01 => "End user congestion",
    0x02 => "End user failure",
    0x03 => "SCCP user originated",
    0x04 => "Destination address unknown",
    0x05 => "Destination inaccessible",
    0x06 => "Network resource - QOS not available/non-transient",
    0x07 => "Network resource - QOS not available/transient",
    0x08 => "Access failure",
    0x09 => "Access congestion",
    0x0a => "Subsystem failure",
    0x0b => "Subsystem congestion",
    0x0c => "Expiration of connection establishment timer",
    0x0d => "Incompatible user data",
    0x0f => "Unqualified",
    0x10 => "Hop counter violation",
    0x11 => "SCCP failure",
    0x12 => "No translation for an address of such nature",
    0x13 => "Unequipped user",
};
