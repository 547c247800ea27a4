//! Recursive-descent parser for the State Transition Language (§4.B).
//!
//! [`parse_module`] turns STL source text into an [`stl_ast::Module`]. On
//! failure it returns an [`Abort`] wrapping a fully rendered [`stl_error::Diagnostic`].

mod cursor;
mod error;
mod parser;
mod value;

pub use error::Abort;
pub use parser::parse_module;

#[cfg(test)]
mod tests {
    use super::*;
    use stl_ast::{PrimitiveType, TransitionKind, Value};
    use stl_diagnostics_codes::DiagnosticCode;

    #[test]
    fn parses_module_header_and_const() {
        let module = parse_module("module foo;\nconst int a = 1;\n", "test.stl").unwrap();
        assert_eq!(module.name, "foo");
        let a = module.consts.get("a").unwrap();
        assert_eq!(a.ty, PrimitiveType::Int);
        assert_eq!(a.value, Some(Value::Int(1)));
    }

    #[test]
    fn missing_semicolon_after_module_name_is_201() {
        let err = parse_module("module foo\nconst int a = 1;\n", "test.stl").unwrap_err();
        assert_eq!(err.diagnostic.code, DiagnosticCode::MissingSemicolon);
        assert_eq!(err.diagnostic.position.line, 2);
    }

    #[test]
    fn parses_role_with_fields() {
        let src = r#"
            module foo;
            role Client {
                required string name;
                optional int retries : ord=1;
                repeated bool flags;
            }
        "#;
        let module = parse_module(src, "test.stl").unwrap();
        let role = module.roles.get("Client").unwrap();
        assert_eq!(role.fields.len(), 3);
        assert!(role.fields[1].rule.optional);
        assert!(role.fields[2].rule.repeated);
    }

    #[test]
    fn parses_state_definition() {
        let src = "module foo;\nstate sConn = [kDisconnected, kConnected];\n";
        let module = parse_module(src, "test.stl").unwrap();
        let state = module.states.get("sConn").unwrap();
        assert_eq!(state.initial_value().as_ref(), "kDisconnected");
    }

    #[test]
    fn parses_message_with_encode_props() {
        let src = r#"
            module foo;
            message Req {
                encode "foo.Req";
                required int request_id : key="ri";
                required string data : key="da";
                required bool broadcast : key="br";
            }
        "#;
        let module = parse_module(src, "test.stl").unwrap();
        let msg = module.messages.get("Req").unwrap();
        assert_eq!(msg.encode.as_deref(), Some("foo.Req"));
    }

    #[test]
    fn parses_message_literal_as_event_call_argument() {
        let src = r#"
            module foo;
            transition tSend(c, s) {
                pre_states = [[sConn.kConnected]];
                events {
                    c -> Send(Packet { seq: 1 }) -> s;
                }
                post_states = [sConn.kConnected];
            }
        "#;
        let module = parse_module(src, "test.stl").unwrap();
        let t = module.transitions.get("tSend").unwrap();
        match &t.kind {
            TransitionKind::Full { events, .. } => match &events[0].args[0] {
                Value::Message { name, fields } => {
                    assert_eq!(name.as_ref(), "Packet");
                    assert_eq!(fields.len(), 1);
                }
                other => panic!("expected a message literal, got {other:?}"),
            },
            TransitionKind::Expansion { .. } => panic!("expected full transition"),
        }
    }

    #[test]
    fn parses_qualifier() {
        let src = r#"
            module foo;
            qualifier UniqueId : int () {
                external "foo.UniqueId";
            }
        "#;
        let module = parse_module(src, "test.stl").unwrap();
        assert!(module.qualifiers.get("UniqueId").is_some());
    }

    #[test]
    fn parses_external_event_with_context() {
        let src = r#"
            module foo;
            event Connect(c, s) {
                external "foo.Connect";
            }
        "#;
        let module = parse_module(src, "test.stl").unwrap();
        let ev = module.events.get("Connect").unwrap();
        assert!(matches!(ev.kind, stl_ast::EventKind::External { .. }));
    }

    #[test]
    fn parses_full_transition() {
        let src = r#"
            module foo;
            transition tConnect(c, s) {
                pre_states = [[sConn.kDisconnected]];
                events {
                    c -> Connect($c, $s) -> s;
                }
                post_states = [sConn.kConnected];
                error_states = [sConn.kDisconnected];
            }
        "#;
        let module = parse_module(src, "test.stl").unwrap();
        let t = module.transitions.get("tConnect").unwrap();
        match &t.kind {
            TransitionKind::Full { pre_states, events, post_states, error_states, .. } => {
                assert_eq!(pre_states.len(), 1);
                assert_eq!(events.len(), 1);
                assert_eq!(post_states.len(), 1);
                assert_eq!(error_states.len(), 1);
            }
            TransitionKind::Expansion { .. } => panic!("expected full transition"),
        }
    }

    #[test]
    fn transition_missing_pre_states_is_302() {
        let src = "module foo;\ntransition t() {\n}\n";
        let err = parse_module(src, "test.stl").unwrap_err();
        assert_eq!(err.diagnostic.code, DiagnosticCode::MissingPreStates);
    }

    #[test]
    fn transition_empty_pre_states_is_303() {
        let src = "module foo;\ntransition t() {\npre_states = [];\n}\n";
        let err = parse_module(src, "test.stl").unwrap_err();
        assert_eq!(err.diagnostic.code, DiagnosticCode::EmptyPreStates);
    }

    #[test]
    fn transition_missing_post_states_is_301() {
        let src = r#"
            module foo;
            transition t() {
                pre_states = [[sConn.kA]];
                events { }
            }
        "#;
        let err = parse_module(src, "test.stl").unwrap_err();
        assert_eq!(err.diagnostic.code, DiagnosticCode::MissingPostStates);
    }

    #[test]
    fn parses_transition_expansion() {
        let src = "module foo;\ntransition t2(x) = t1($x);\n";
        let module = parse_module(src, "test.stl").unwrap();
        let t2 = module.transitions.get("t2").unwrap();
        assert!(matches!(t2.kind, TransitionKind::Expansion { .. }));
    }

    #[test]
    fn unterminated_string_reports_lex_error() {
        let src = "module foo;\nconst string a = \"unterminated;\n";
        let err = parse_module(src, "test.stl").unwrap_err();
        assert_eq!(err.diagnostic.code, DiagnosticCode::MissingStringQuote);
    }

    #[test]
    fn duplicate_const_is_logged_not_fatal() {
        let src = "module foo;\nconst int a = 1;\nconst int a = 2;\n";
        let module = parse_module(src, "test.stl").unwrap();
        assert_eq!(module.consts.len(), 1);
        assert_eq!(module.consts.get("a").unwrap().value, Some(Value::Int(1)));
    }
}
