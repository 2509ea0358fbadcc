#![allow(dead_code)]

// Tests that a fallback variant catches every unlisted code

use sigdec::Dispatch;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Dispatch)]
enum Order {
    #[sigdec(code = 0x10)]
    Release,
    #[sigdec(code = 0x1B)]
    ServiceOptionRequest,
    #[sigdec(fallback, rename = "Reserved")]
    Reserved,
}

fn main() {
    assert_eq!(Order::classify(0x42), Some(Order::Reserved));
    assert_eq!(Order::Reserved.code(), None);
    assert_eq!(Order::ServiceOptionRequest.label(), "Service Option Request");
    assert_eq!(Order::VALUES.entries().len(), 2);
}
