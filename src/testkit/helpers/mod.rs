//! Object helpers that create and clean up test objects through the SDK.

mod network_rule;

pub use network_rule::NetworkRuleHelper;
