/* ================================
 * token lines / groups / fragments
 * ================================ */

fn build_items<'i>(pairs: impl Iterator<Item = Pair<'i, Rule>>) -> Vec<Node> {
    pairs.map(build_token).collect()
}

fn build_token(p: Pair<Rule>) -> Node {
    match p.as_rule() {
        Rule::space => Node::Lit(Literal::Space),
        Rule::wrap => Node::Lit(Literal::Break),
        Rule::ident => ident_of(&p),
        Rule::line_comment | Rule::block_comment => comment_of(&p),
        Rule::paren => build_group(p, Delim::Paren),
        Rule::bracket => build_group(p, Delim::Bracket),
        Rule::brace => build_group(p, Delim::Brace),
        // number, string_lit, raw_string, rune_lit, op
        _ => Node::token(p.as_str(), pos_of(&p)),
    }
}

/// A bracketed group: one `Seq` per source line between the delimiters.
fn build_group(p: Pair<Rule>, delim: Delim) -> Node {
    let open = Node::token(delim.open(), pos_of(&p));
    let lines = p
        .into_inner()
        .filter(|l| l.as_rule() == Rule::line)
        .map(|l| Node::Seq(build_items(l.into_inner())))
        .collect();
    Aggregate::new(Kind::Group(delim))
        .with("open", FieldMode::Fixed, open)
        .with("lines", FieldMode::Any, Node::Seq(lines))
        .into_node()
}

/// Flatten the lines of `pairs` into one token line, comments dropped.
fn flat_items<'i>(lines: impl Iterator<Item = Pair<'i, Rule>>) -> Vec<Node> {
    let mut out = Vec::new();
    for (i, line) in lines.filter(|l| l.as_rule() == Rule::line).enumerate() {
        if i > 0 {
            out.push(Node::Lit(Literal::Space));
        }
        out.extend(
            build_items(line.into_inner())
                .into_iter()
                .filter(|n| !matches!(n, Node::Lit(Literal::Comment { .. }))),
        );
    }
    out
}

/// Wrap a token line as a single node: a lone item stands for itself.
fn fragment(mut items: Vec<Node>) -> Node {
    if items.len() == 1 {
        items.pop().unwrap_or_else(Node::empty)
    } else {
        Node::Seq(items)
    }
}

/// Parse a free-standing expression or type, e.g. a template argument
/// such as `map[string]int` or `func(a, b int8) bool { return a < b }`.
pub fn parse_expr(src: &str) -> Result<Node, ParseError> {
    let root = GoParser::parse(Rule::expr_source, src)?
        .next()
        .ok_or_else(|| ParseError::at(Span::DUMMY, "empty expression"))?;
    let items = trim_spaces(flat_items(root.into_inner()));
    if items.is_empty() {
        return Err(ParseError::at(Span { start: 0, end: src.len() }, "empty expression"));
    }
    Ok(fragment(items))
}

/// Parse `Name(arg, ...)` into the name and one node per argument.
///
/// A trailing comma is accepted; any other empty argument is an error.
pub fn parse_call(src: &str) -> Result<(Ident, Vec<Node>), ParseError> {
    let root = GoParser::parse(Rule::call, src)?
        .next()
        .ok_or_else(|| ParseError::at(Span::DUMMY, "empty call"))?;

    let mut name = None;
    let mut args_pair = None;
    for child in root.into_inner() {
        match child.as_rule() {
            Rule::ident => name = Some(Ident { name: child.as_str().to_string(), pos: pos_of(&child) }),
            Rule::paren => args_pair = Some(child),
            Rule::EOI => {}
            other => return Err(unexpected("call", other, &child)),
        }
    }
    let name = name.ok_or_else(|| ParseError::at(Span::DUMMY, "call: missing name"))?;
    let args_pair = args_pair.ok_or_else(|| ParseError::at(Span::DUMMY, "call: missing `(`"))?;
    let args_span = sp_of(&args_pair);

    let mut args: Vec<Vec<Node>> = vec![Vec::new()];
    for item in flat_items(args_pair.into_inner()) {
        match &item {
            Node::Lit(Literal::Token { text, .. }) if text == "," => args.push(Vec::new()),
            _ => {
                if let Some(cur) = args.last_mut() {
                    cur.push(item);
                }
            }
        }
    }
    let mut args: Vec<Vec<Node>> = args.into_iter().map(trim_spaces).collect();
    if args.last().is_some_and(Vec::is_empty) {
        args.pop();
    }
    if args.iter().any(Vec::is_empty) {
        return Err(ParseError::at(args_span, "call: empty argument"));
    }
    Ok((name, args.into_iter().map(fragment).collect()))
}

/// Read only the package clause of a source unit.
pub fn parse_package_clause(src: &str) -> Result<String, ParseError> {
    let root = GoParser::parse(Rule::package_only, src)?
        .next()
        .ok_or_else(|| ParseError::at(Span::DUMMY, "empty source"))?;
    root.into_inner()
        .find(|p| p.as_rule() == Rule::package_clause)
        .and_then(|p| p.into_inner().find(|i| i.as_rule() == Rule::ident))
        .map(|id| id.as_str().to_string())
        .ok_or_else(|| ParseError::at(Span::DUMMY, "expected `package` clause"))
}
