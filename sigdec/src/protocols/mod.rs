//! Grammars for each supported message family.

pub mod cdma2k;
pub mod gsm_sms;
pub mod sccp;
