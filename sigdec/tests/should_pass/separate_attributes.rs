#![allow(dead_code)]

// Tests that options may be split across several attributes

#[derive(Debug, Clone, Copy, PartialEq, Eq, sigdec::Dispatch)]
enum Alphabet {
    #[sigdec(code = 0)]
    #[sigdec(rename = "GSM 7 bit default alphabet")]
    Gsm7,
    #[sigdec(code = 2)]
    Ucs2,
    #[sigdec(fallback = true)]
    Other,
}

fn main() {
    use sigdec::Dispatch;
    assert_eq!(Alphabet::Gsm7.label(), "GSM 7 bit default alphabet");
    assert_eq!(Alphabet::classify(1), Some(Alphabet::Other));
}
