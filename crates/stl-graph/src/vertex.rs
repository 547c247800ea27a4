//! A graph vertex: an ordered multiset of `StateValue`s keyed by
//! `StateResolved`, canonicalized by sorting their string forms (§3, §4.F).

use stl_model::StateValue;

#[derive(Debug, Clone)]
pub struct Vertex {
    pub values: Vec<StateValue>,
}

impl Vertex {
    pub fn new(mut values: Vec<StateValue>) -> Self {
        values.sort_by(|a, b| a.canonical_key().cmp(&b.canonical_key()));
        Vertex { values }
    }

    pub fn canonical_key(&self) -> String {
        self.values.iter().map(|v| v.canonical_key()).collect::<Vec<_>>().join("|")
    }

    pub fn get(&self, state_name: &str) -> Option<&StateValue> {
        self.values.iter().find(|v| &*v.state.name == state_name)
    }
}

/// `post_states` extended with any `vertex` entries whose state isn't
/// already assigned by `post_states` (§4.F output-vertex construction).
pub fn extend(post_states: &[StateValue], vertex: &[StateValue]) -> Vertex {
    let mut values = post_states.to_vec();
    for sv in vertex {
        if !values.iter().any(|v| v.state.name == sv.state.name) {
            values.push(sv.clone());
        }
    }
    Vertex::new(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use stl_model::StateResolved;

    fn sv(name: &str, symbol: &str) -> StateValue {
        StateValue::new(StateResolved::new(name.into(), vec![]), symbol.into())
    }

    #[test]
    fn extend_keeps_unassigned_vertex_states() {
        let vertex = vec![sv("sConn", "kConnected"), sv("sAuth", "kUnauthed")];
        let post = vec![sv("sAuth", "kAuthed")];
        let extended = extend(&post, &vertex);
        assert_eq!(extended.get("sConn").unwrap().symbol.as_ref(), "kConnected");
        assert_eq!(extended.get("sAuth").unwrap().symbol.as_ref(), "kAuthed");
    }

    #[test]
    fn canonical_key_is_order_independent() {
        let a = Vertex::new(vec![sv("sB", "k1"), sv("sA", "k2")]);
        let b = Vertex::new(vec![sv("sA", "k2"), sv("sB", "k1")]);
        assert_eq!(a.canonical_key(), b.canonical_key());
    }
}
