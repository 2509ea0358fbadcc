use crate::{vals, Dispatch, ValueStrings};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Dispatch)]
pub enum Channel {
    #[sigdec(code = 0, rename = "r-csch")]
    RCsch,
    #[sigdec(code = 1, rename = "f-csch")]
    FCsch,
    #[sigdec(code = 2, rename = "r-dsch")]
    RDsch,
    #[sigdec(code = 3, rename = "f-dsch")]
    FDsch,
}

impl Channel {
    /// Maps the two-bit CHANNEL field. Bits above the field are ignored.
    pub fn from_bits(bits: u64) -> Channel {
        match bits & 0b11 {
            0 => Channel::RCsch,
            1 => Channel::FCsch,
            2 => Channel::RDsch,
            _ => Channel::FDsch,
        }
    }

    pub fn is_forward(&self) -> bool {
        matches!(self, Channel::FCsch | Channel::FDsch)
    }

    pub(crate) fn message_types(&self) -> ValueStrings {
        match self {
            Channel::RCsch => R_CSCH_MESSAGES,
            Channel::FCsch => F_CSCH_MESSAGES,
            Channel::RDsch => R_DSCH_MESSAGES,
            Channel::FDsch => F_DSCH_MESSAGES,
        }
    }
}

const R_CSCH_MESSAGES: ValueStrings = vals! {
    1 => "Registration Message",
    2 => "Order Message",
    3 => "Data Burst Message",
    4 => "Origination Message",
    5 => "Page Response Message",
    6 => "Authentication Challenge Response Message",
};

const F_CSCH_MESSAGES: ValueStrings = vals! {
    7 => "Order Message",
    9 => "Data Burst Message",
    10 => "Authentication Challenge Message",
    17 => "General Page Message",
};

const R_DSCH_MESSAGES: ValueStrings = vals! {
    1 => "Order Message",
    2 => "Authentication Challenge Response Message",
    4 => "Data Burst Message",
};

const F_DSCH_MESSAGES: ValueStrings = vals! {
    1 => "Order Message",
    2 => "Authentication Challenge Message",
    3 => "Alert With Information Message",
    4 => "Data Burst Message",
    17 => "Handoff Direction Message",
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Dispatch)]
pub enum HeaderRecordType {
    #[sigdec(code = 0)]
    Addressing,
    #[sigdec(code = 1)]
    Authentication,
    #[sigdec(code = 2, rename = "Message Integrity")]
    MessageIntegrity,
    #[sigdec(code = 3, rename = "ARQ")]
    Arq,
    #[sigdec(fallback)]
    Unknown,
}

pub(crate) const MSID_TYPES: ValueStrings = vals! {
    0 => "IMSI_S and ESN",
    1 => "ESN",
    2 => "IMSI",
    3 => "IMSI and ESN",
    4 => "TMSI",
    5 => "Extended MSID",
    7 => "Broadcast Address",
};

pub(crate) const EXT_MSID_TYPES: ValueStrings = vals! {
    0 => "MEID",
    1 => "IMSI and MEID",
    2 => "IMSI and ESN",
};

pub(crate) const IMSI_CLASSES: ValueStrings = vals! {
    0 => "IMSI Class 0",
    1 => "IMSI Class 1",
};

pub(crate) const AUTH_MODES: ValueStrings = vals! {
    0 => "No authentication",
    1 => "Authentication data included",
};

pub(crate) const REG_TYPES: ValueStrings = vals! {
    0 => "Timer-based",
    1 => "Power-up",
    2 => "Zone-based",
    3 => "Power-down",
    4 => "Parameter-change",
    5 => "Ordered",
    6 => "Distance-based",
    7 => "User Zone-based",
    8 => "Encryption/Message Integrity Resync",
    9 => "BCMC Registration",
};

pub(crate) const RETURN_CAUSES: ValueStrings = vals! {
    0 => "Normal access",
    1 => "Service redirection failure",
    2 => "Loss of pilot",
    3 => "Failed to access",
    4 => "Service not available",
};

pub(crate) const REQUEST_MODES: ValueStrings = vals! {
    1 => "CDMA only",
    2 => "Wide analog only",
    3 => "Either wide analog or CDMA",
};

pub(crate) const BURST_TYPES: ValueStrings = vals! {
    0 => "Unknown",
    1 => "Asynchronous Data Services",
    2 => "Group-3 Facsimile",
    3 => "Short Message Services",
    4 => "Over-the-Air Service Provisioning",
    5 => "Position Determination Services",
    6 => "Short Data Burst",
    62 => "Extended Burst Type - International",
    63 => "Extended Burst Type",
};

pub(crate) const NUMBER_TYPES: ValueStrings = vals! {
    0 => "Unknown",
    1 => "International number",
    2 => "National number",
    3 => "Network-specific number",
    4 => "Subscriber number",
    6 => "Abbreviated number",
};

pub(crate) const NUMBER_PLANS: ValueStrings = vals! {
    0 => "Unknown",
    1 => "ISDN/Telephony numbering plan",
    3 => "Data numbering plan",
    4 => "Telex numbering plan",
    9 => "Private numbering plan",
};

pub(crate) const PRESENTATION_INDICATORS: ValueStrings = vals! {
    0 => "Presentation allowed",
    1 => "Presentation restricted",
    2 => "Number not available",
};

pub(crate) const SCREENING_INDICATORS: ValueStrings = vals! {
    0 => "User-provided, not screened",
    1 => "User-provided, verified and passed",
    2 => "User-provided, verified and failed",
    3 => "Network-provided",
};

pub(crate) const PAGE_CLASSES: ValueStrings = vals! {
    0 => "IMSI Class 0",
    1 => "IMSI Class 1",
    2 => "TMSI",
    3 => "Broadcast",
};

pub(crate) const SIGNAL_TYPES: ValueStrings = vals! {
    0 => "Tone signal",
    1 => "ISDN Alerting",
    2 => "IS-54B Alerting",
};

pub(crate) const ALERT_PITCHES: ValueStrings = vals! {
    0 => "Medium pitch",
    1 => "High pitch",
    2 => "Low pitch",
};

pub(crate) const RETRY_TYPES: ValueStrings = vals! {
    0 => "Clear all retry delays",
    1 => "Origination",
    2 => "Resource request",
    3 => "Supplemental channel request",
    4 => "Short data burst",
};

pub(crate) const ENCRYPT_MODES: ValueStrings = vals! {
    0 => "Encryption disabled",
    1 => "CMEA",
    2 => "ECMEA",
    3 => "Rijndael",
};

pub(crate) const PLCM_TYPES: ValueStrings = vals! {
    0 => "ESN-based",
    1 => "Base station specified PLCM_39",
    2 => "IMSI_M based",
    3 => "IMSI_T based",
    4 => "MEID-based",
};

pub(crate) const PILOT_REC_TYPES: ValueStrings = vals! {
    0 => "Transmit diversity pilot",
    1 => "Auxiliary pilot",
};

pub(crate) const DIGIT_MODES: ValueStrings = vals! {
    0 => "4-bit DTMF",
    1 => "8-bit ASCII",
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Dispatch)]
pub enum ReverseOrder {
    #[sigdec(code = 2, rename = "Base Station Challenge Order")]
    BaseStationChallenge,
    #[sigdec(code = 3, rename = "SSD Update Confirmation Order")]
    SsdUpdateConfirmation,
    #[sigdec(code = 5, rename = "Parameter Update Confirmation Order")]
    ParameterUpdateConfirmation,
    #[sigdec(code = 12, rename = "Mobile Station Reject Order")]
    MobileStationReject,
    #[sigdec(code = 16, rename = "Mobile Station Acknowledgement Order")]
    Acknowledgement,
    #[sigdec(code = 21, rename = "Release Order")]
    Release,
    #[sigdec(code = 24, rename = "Service Option Request Order")]
    ServiceOptionRequest,
    #[sigdec(code = 25, rename = "Service Option Response Order")]
    ServiceOptionResponse,
    #[sigdec(fallback)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Dispatch)]
pub enum ForwardOrder {
    #[sigdec(code = 1, rename = "Abbreviated Alert Order")]
    AbbreviatedAlert,
    #[sigdec(code = 2, rename = "Base Station Challenge Confirmation Order")]
    BaseStationChallengeConfirmation,
    #[sigdec(code = 4, rename = "Reorder Order")]
    Reorder,
    #[sigdec(code = 5, rename = "Parameter Update Order")]
    ParameterUpdate,
    #[sigdec(code = 6, rename = "Audit Order")]
    Audit,
    #[sigdec(code = 9, rename = "Intercept Order")]
    Intercept,
    #[sigdec(code = 16, rename = "Base Station Acknowledgement Order")]
    Acknowledgement,
    #[sigdec(code = 21, rename = "Release Order")]
    Release,
    #[sigdec(code = 24, rename = "Service Option Request Order")]
    ServiceOptionRequest,
    #[sigdec(code = 25, rename = "Service Option Response Order")]
    ServiceOptionResponse,
    #[sigdec(code = 27, rename = "Retry Order")]
    Retry,
    #[sigdec(code = 34, rename = "BCMC Order")]
    Bcmc,
    #[sigdec(fallback)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Dispatch)]
pub enum InfoRecordType {
    #[sigdec(code = 0x01)]
    Display,
    #[sigdec(code = 0x02)]
    CalledPartyNumber,
    #[sigdec(code = 0x03)]
    CallingPartyNumber,
    #[sigdec(code = 0x04)]
    ConnectedNumber,
    #[sigdec(code = 0x05)]
    Signal,
    #[sigdec(code = 0x06)]
    MessageWaiting,
    #[sigdec(code = 0x08)]
    CalledPartySubaddress,
    #[sigdec(code = 0x0B)]
    RedirectingNumber,
    #[sigdec(code = 0x0F)]
    LineControl,
    #[sigdec(code = 0x10)]
    ExtendedDisplay,
    #[sigdec(fallback)]
    Unknown,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_channel_code_has_a_channel() {
        for code in 0..4u64 {
            let channel = Channel::from_bits(code);
            assert_eq!(channel.code(), Some(code));
            assert_eq!(Channel::from_code(code), Some(channel));
        }
        assert!(Channel::from_bits(1).is_forward());
        assert!(!Channel::from_bits(2).is_forward());
    }
}
