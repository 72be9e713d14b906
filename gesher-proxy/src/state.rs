use gesher_rule_index::RuleIndexHandle;

/// Shared state behind every request handler: the live snapshot handle
/// that admission requests are resolved against.
pub struct ProxyState {
    pub rule_index: RuleIndexHandle,
}

impl ProxyState {
    pub fn new(rule_index: RuleIndexHandle) -> Self {
        Self { rule_index }
    }
}
