//! Locating the `// template type Name(P1, P2)` directive.

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::TemplateError;
use crate::frontend::span::Span;
use crate::frontend::tree::{Node, SyntaxTree};
use crate::frontend::{parse_call, print_node};
use crate::utils::fast::SmallVec4;

static DIRECTIVE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^//\s*template\s+type\s+(\w+\s*.*?)\s*$").unwrap_or_else(|e| panic!("directive regex: {e}"))
});

/// Name and formal parameters declared by a template source unit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TemplateDefinition {
    pub name: String,
    pub params: SmallVec4<String>,
    /// Where the directive was found
    pub span: Option<Span>,
}

impl TemplateDefinition {
    pub fn is_param(&self, name: &str) -> bool {
        self.params.iter().any(|p| p == name)
    }

    /// The caller must supply exactly one argument per formal parameter.
    pub fn check_arity(&self, supplied: usize) -> Result<(), TemplateError> {
        if self.params.len() != supplied {
            return Err(TemplateError::Arity { expected: self.params.len(), supplied, span: self.span });
        }
        Ok(())
    }
}

/// Find the single template directive among the comments of `tree`.
pub fn locate(tree: &SyntaxTree, file: &str) -> Result<TemplateDefinition, TemplateError> {
    let mut found: Option<TemplateDefinition> = None;
    // block comments never hold a directive
    for (text, pos) in tree.comments().into_iter().filter(|(t, _)| t.starts_with("//")) {
        let Some(caps) = DIRECTIVE.captures(text) else { continue };
        let span = pos.offset().map(|o| Span { start: o, end: o + text.len() });
        if found.is_some() {
            return Err(TemplateError::definition(
                format!("found multiple template definitions in {file}"),
                span,
            ));
        }
        let call = caps.get(1).map_or("", |m| m.as_str());
        let (name, params) = parse_params(call, span)?;
        debug!("template definition {name}({}) in {file}", params.join(", "));
        found = Some(TemplateDefinition { name, params, span });
    }
    found.ok_or_else(|| TemplateError::definition(format!("didn't find template definition in {file}"), None))
}

fn parse_params(call: &str, span: Option<Span>) -> Result<(String, SmallVec4<String>), TemplateError> {
    let (name, args) = parse_template_and_args(call, span)?;
    let params = args
        .iter()
        .map(|arg| {
            arg.bare_ident()
                .map(|id| id.name.clone())
                .ok_or_else(|| TemplateError::shape(format!("expected identifier instead of {}", print_node(arg)), span))
        })
        .collect::<Result<SmallVec4<_>, _>>()?;
    Ok((name, params))
}

/// Split `Name(arg, ...)` into the name and the argument trees.
pub fn parse_template_and_args(text: &str, span: Option<Span>) -> Result<(String, Vec<Node>), TemplateError> {
    let (name, args) = parse_call(text).map_err(|e| {
        debug!("call parse error in {text:?}: {e}");
        TemplateError::shape(format!("failed to parse {text:?}: expecting Identifier(...)"), span)
    })?;
    Ok((name.name, args))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::parse_file;

    fn locate_src(src: &str) -> Result<TemplateDefinition, TemplateError> {
        locate(&parse_file(src).expect("parse"), "t.go")
    }

    #[test]
    fn finds_directive_with_params() {
        let def = locate_src("package heap\n\n// An A is the element\n//\n// template type Heap(A, Less)\ntype A int\n").unwrap();
        assert_eq!(def.name, "Heap");
        assert_eq!(def.params.as_slice(), ["A", "Less"]);
        assert!(def.is_param("Less"));
        let span = def.span.expect("span");
        assert!(span.start > 0);
    }

    #[test]
    fn directive_spacing_is_lenient() {
        let def = locate_src("package p\n//template   type   Pair(K,V)   \n").unwrap();
        assert_eq!(def.name, "Pair");
        assert_eq!(def.params.as_slice(), ["K", "V"]);
    }

    #[test]
    fn block_comments_are_ignored() {
        let src = "package p\n/*\n// template type Old(A)\n*/\n// template type Box(A)\ntype A int\n";
        let def = locate_src(src).unwrap();
        assert_eq!(def.name, "Box");
        let span = def.span.expect("span");
        assert_eq!(span.start, "package p\n/*\n// template type Old(A)\n*/\n".len());

        let err = locate_src("package p\n/* template type Box(A) */\n").unwrap_err();
        assert!(err.to_string().contains("didn't find"), "{err}");
    }

    #[test]
    fn zero_or_two_directives_fail() {
        let err = locate_src("package p\n// nothing here\n").unwrap_err();
        assert!(matches!(err, TemplateError::Definition { .. }));
        assert!(err.to_string().contains("t.go"));

        let err = locate_src("package p\n// template type A(X)\n// template type B(Y)\n").unwrap_err();
        assert!(err.to_string().contains("multiple"), "{err}");
    }

    #[test]
    fn non_bare_param_is_a_shape_error() {
        let err = locate_src("package p\n// template type Set([]A)\n").unwrap_err();
        assert!(matches!(err, TemplateError::Shape { .. }));
        assert!(err.to_string().contains("[]A"), "{err}");
    }

    #[test]
    fn non_call_directive_is_a_shape_error() {
        let err = locate_src("package p\n// template type Set\n").unwrap_err();
        assert!(matches!(err, TemplateError::Shape { .. }));
    }

    #[test]
    fn arity_for_every_count() {
        for k in 0..5usize {
            let params = (0..k).map(|i| format!("P{i}")).collect::<Vec<_>>().join(", ");
            let def = locate_src(&format!("package p\n// template type T({params})\n")).unwrap();
            assert_eq!(def.params.len(), k);
            assert!(def.check_arity(k).is_ok());
            for supplied in (0..7).filter(|s| *s != k) {
                match def.check_arity(supplied) {
                    Err(TemplateError::Arity { expected, supplied: got, .. }) => {
                        assert_eq!((expected, got), (k, supplied));
                    }
                    other => panic!("expected arity error, got {other:?}"),
                }
            }
        }
    }

    #[test]
    fn request_text_keeps_argument_trees() {
        let (name, args) = parse_template_and_args("MySet(map[string]int)", None).unwrap();
        assert_eq!(name, "MySet");
        assert_eq!(print_node(&args[0]), "map[string]int");
        assert!(parse_template_and_args("1 + 2", None).is_err());
    }
}
