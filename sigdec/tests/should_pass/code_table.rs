#![allow(dead_code)]

// Tests that a code table with explicit codes and labels compiles

use sigdec::Dispatch;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Dispatch)]
enum RoutingIndicator {
    #[sigdec(code = 0, rename = "Route on GT")]
    GlobalTitle,
    #[sigdec(code = 1, rename = "Route on SSN")]
    Subsystem,
}

fn main() {
    assert_eq!(RoutingIndicator::from_code(1), Some(RoutingIndicator::Subsystem));
    assert_eq!(RoutingIndicator::classify(2), None);
    assert_eq!(RoutingIndicator::VALUES.get(0), Some("Route on GT"));
}
