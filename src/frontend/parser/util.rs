#[inline]
fn sp_of(p: &Pair<Rule>) -> Span {
    p.as_span().into()
}

#[inline]
fn pos_of(p: &Pair<Rule>) -> Pos {
    Pos::from_offset(p.as_span().start())
}

#[inline]
fn ident_of(p: &Pair<Rule>) -> Node {
    Node::ident(p.as_str(), pos_of(p))
}

fn comment_of(p: &Pair<Rule>) -> Node {
    Node::Lit(Literal::Comment { text: p.as_str().trim_end().to_string(), pos: pos_of(p) })
}

/// Drop spaces at both ends of a token line.
fn trim_spaces(mut items: Vec<Node>) -> Vec<Node> {
    while matches!(items.last(), Some(Node::Lit(Literal::Space))) {
        items.pop();
    }
    let lead = items.iter().take_while(|n| matches!(n, Node::Lit(Literal::Space))).count();
    items.drain(..lead);
    items
}

fn unexpected(ctx: &str, rule: Rule, p: &Pair<Rule>) -> ParseError {
    ParseError::at(sp_of(p), format!("{ctx}: unexpected {}", rule_label(&rule)))
}
