//! Abstract syntax tree for Jack source.
//!
//! A single tagged `Node` (`Terminal` wrapping a `Token`, or `NonTerminal`
//! carrying a fixed `Tag` and a flat child list) stands in for the source's
//! one-class-per-grammar-rule hierarchy. There is deliberately no
//! `subroutineCall` tag: a call is just a run of terminals and expression
//! lists embedded directly in `doStatement` or `term`, matching the
//! grammar's own treatment of it as a fragment rather than a rule.
//!
//! Named accessors are layered on top of the positional children so callers
//! don't have to remember slot indices, without hiding the underlying
//! positional structure.

use crate::token::Token;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    Class,
    ClassVarDec,
    SubroutineDec,
    ParameterList,
    SubroutineBody,
    VarDec,
    Statements,
    LetStatement,
    DoStatement,
    ReturnStatement,
    WhileStatement,
    IfStatement,
    Expression,
    Term,
    ExpressionList,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Terminal(Token),
    NonTerminal { tag: Tag, children: Vec<Node> },
}

/// The syntactic shape of a `term` node, used by the code generator to
/// dispatch without re-deriving it from raw children each time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermKind {
    IntConst,
    StringConst,
    KeywordConst,
    Var,
    IndexedVar,
    Parenthesized,
    Unary,
    UnqualifiedCall,
    QualifiedCall,
}

impl Node {
    #[must_use]
    pub fn non_terminal(tag: Tag, children: Vec<Node>) -> Self {
        Node::NonTerminal { tag, children }
    }

    #[must_use]
    pub fn tag(&self) -> Option<Tag> {
        match self {
            Node::NonTerminal { tag, .. } => Some(*tag),
            Node::Terminal(_) => None,
        }
    }

    #[must_use]
    pub fn children(&self) -> &[Node] {
        match self {
            Node::NonTerminal { children, .. } => children,
            Node::Terminal(_) => &[],
        }
    }

    #[must_use]
    pub fn as_token(&self) -> Option<&Token> {
        match self {
            Node::Terminal(t) => Some(t),
            Node::NonTerminal { .. } => None,
        }
    }

    fn identifier_at(&self, index: usize) -> &str {
        self.children()[index]
            .as_token()
            .and_then(Token::as_identifier)
            .expect("expected an identifier at this position")
    }

    fn type_text_at(&self, index: usize) -> &str {
        match self.children()[index].as_token().expect("expected a type token") {
            Token::Keyword(k) => k.as_str(),
            Token::Identifier(name) => name.as_str(),
            other => panic!("unexpected token in type position: {other:?}"),
        }
    }

    fn keyword_text_at(&self, index: usize) -> &str {
        match self.children()[index].as_token().expect("expected a keyword") {
            Token::Keyword(k) => k.as_str(),
            other => panic!("expected a keyword, found {other:?}"),
        }
    }

    // --- class ---

    #[must_use]
    pub fn class_name(&self) -> &str {
        self.identifier_at(1)
    }

    #[must_use]
    pub fn class_var_decs(&self) -> impl Iterator<Item = &Node> {
        self.children()
            .iter()
            .filter(|n| n.tag() == Some(Tag::ClassVarDec))
    }

    #[must_use]
    pub fn subroutine_decs(&self) -> impl Iterator<Item = &Node> {
        self.children()
            .iter()
            .filter(|n| n.tag() == Some(Tag::SubroutineDec))
    }

    // --- classVarDec / varDec ---

    #[must_use]
    pub fn var_kind(&self) -> &str {
        self.keyword_text_at(0)
    }

    #[must_use]
    pub fn var_type(&self) -> &str {
        self.type_text_at(1)
    }

    #[must_use]
    pub fn var_names(&self) -> Vec<&str> {
        self.children()[2..]
            .iter()
            .filter_map(Node::as_token)
            .filter_map(|t| match t {
                Token::Identifier(name) => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }

    // --- subroutineDec ---

    #[must_use]
    pub fn subroutine_kind(&self) -> &str {
        self.keyword_text_at(0)
    }

    #[must_use]
    pub fn subroutine_return_type(&self) -> &str {
        self.type_text_at(1)
    }

    #[must_use]
    pub fn subroutine_name(&self) -> &str {
        self.identifier_at(2)
    }

    #[must_use]
    pub fn subroutine_parameters(&self) -> &Node {
        self.children()
            .iter()
            .find(|n| n.tag() == Some(Tag::ParameterList))
            .expect("subroutineDec always has a parameterList")
    }

    #[must_use]
    pub fn subroutine_body(&self) -> &Node {
        self.children()
            .iter()
            .find(|n| n.tag() == Some(Tag::SubroutineBody))
            .expect("subroutineDec always has a subroutineBody")
    }

    // --- parameterList: flat (type, name) pairs separated by commas ---

    #[must_use]
    pub fn parameters(&self) -> Vec<(&str, &str)> {
        let tokens: Vec<&Token> = self.children().iter().filter_map(Node::as_token).collect();
        tokens
            .chunks(3)
            .map(|chunk| {
                let ty = match chunk[0] {
                    Token::Keyword(k) => k.as_str(),
                    Token::Identifier(name) => name.as_str(),
                    other => panic!("unexpected type token in parameterList: {other:?}"),
                };
                let name = chunk[1]
                    .as_identifier()
                    .expect("parameter name must be an identifier");
                (ty, name)
            })
            .collect()
    }

    // --- subroutineBody ---

    #[must_use]
    pub fn body_var_decs(&self) -> impl Iterator<Item = &Node> {
        self.children()
            .iter()
            .filter(|n| n.tag() == Some(Tag::VarDec))
    }

    #[must_use]
    pub fn body_statements(&self) -> &Node {
        self.children()
            .iter()
            .find(|n| n.tag() == Some(Tag::Statements))
            .expect("subroutineBody always has a statements node")
    }

    // --- statements ---

    #[must_use]
    pub fn statement_list(&self) -> &[Node] {
        self.children()
    }

    // --- letStatement: let name ('[' expr ']')? '=' expr ';' ---

    #[must_use]
    pub fn let_var_name(&self) -> &str {
        self.identifier_at(1)
    }

    #[must_use]
    pub fn let_index(&self) -> Option<&Node> {
        if self.children().get(2).and_then(Node::as_token) == Some(&Token::Symbol('[')) {
            Some(&self.children()[3])
        } else {
            None
        }
    }

    #[must_use]
    pub fn let_value(&self) -> &Node {
        self.children()
            .iter()
            .rev()
            .find(|n| n.tag() == Some(Tag::Expression))
            .expect("letStatement always assigns an expression")
    }

    // --- doStatement: do [name '.'] name '(' expressionList ')' ';' ---

    #[must_use]
    pub fn do_call_qualifier(&self) -> Option<&str> {
        if self.children().get(2).and_then(Node::as_token) == Some(&Token::Symbol('.')) {
            Some(self.identifier_at(1))
        } else {
            None
        }
    }

    #[must_use]
    pub fn do_call_name(&self) -> &str {
        if self.do_call_qualifier().is_some() {
            self.identifier_at(3)
        } else {
            self.identifier_at(1)
        }
    }

    #[must_use]
    pub fn do_call_args(&self) -> &Node {
        self.children()
            .iter()
            .find(|n| n.tag() == Some(Tag::ExpressionList))
            .expect("doStatement always carries an expressionList")
    }

    // --- returnStatement ---

    #[must_use]
    pub fn return_value(&self) -> Option<&Node> {
        self.children()
            .iter()
            .find(|n| n.tag() == Some(Tag::Expression))
    }

    // --- whileStatement / ifStatement ---

    #[must_use]
    pub fn condition(&self) -> &Node {
        self.children()
            .iter()
            .find(|n| n.tag() == Some(Tag::Expression))
            .expect("while/if always carries a condition expression")
    }

    #[must_use]
    pub fn then_statements(&self) -> &Node {
        self.children()
            .iter()
            .find(|n| n.tag() == Some(Tag::Statements))
            .expect("while/if always carries a statements block")
    }

    #[must_use]
    pub fn else_statements(&self) -> Option<&Node> {
        self.children()
            .iter()
            .filter(|n| n.tag() == Some(Tag::Statements))
            .nth(1)
    }

    // --- expression / expressionList ---

    #[must_use]
    pub fn expression_terms(&self) -> &[Node] {
        self.children()
    }

    #[must_use]
    pub fn expressions(&self) -> Vec<&Node> {
        self.children()
            .iter()
            .filter(|n| n.tag() == Some(Tag::Expression))
            .collect()
    }

    // --- term ---

    #[must_use]
    pub fn term_kind(&self) -> TermKind {
        let children = self.children();
        match children.first().and_then(Node::as_token) {
            Some(Token::IntConst(_)) => TermKind::IntConst,
            Some(Token::StringConst(_)) => TermKind::StringConst,
            Some(Token::Keyword(_)) => TermKind::KeywordConst,
            Some(Token::Symbol('(')) => TermKind::Parenthesized,
            Some(Token::Symbol(_)) => TermKind::Unary,
            Some(Token::Identifier(_)) => match children.get(1).and_then(Node::as_token) {
                Some(Token::Symbol('[')) => TermKind::IndexedVar,
                Some(Token::Symbol('(')) => TermKind::UnqualifiedCall,
                Some(Token::Symbol('.')) => TermKind::QualifiedCall,
                _ => TermKind::Var,
            },
            None => panic!("term node with no children"),
        }
    }

    #[must_use]
    pub fn term_int_const(&self) -> u16 {
        match self.children()[0].as_token() {
            Some(Token::IntConst(n)) => *n,
            other => panic!("expected an integer constant term, found {other:?}"),
        }
    }

    #[must_use]
    pub fn term_string_const(&self) -> &str {
        match self.children()[0].as_token() {
            Some(Token::StringConst(s)) => s.as_str(),
            other => panic!("expected a string constant term, found {other:?}"),
        }
    }

    #[must_use]
    pub fn term_keyword_const(&self) -> &str {
        self.keyword_text_at(0)
    }

    #[must_use]
    pub fn term_var_name(&self) -> &str {
        self.identifier_at(0)
    }

    #[must_use]
    pub fn term_index(&self) -> &Node {
        &self.children()[2]
    }

    #[must_use]
    pub fn term_parenthesized(&self) -> &Node {
        &self.children()[1]
    }

    #[must_use]
    pub fn term_unary_op(&self) -> char {
        match self.children()[0].as_token() {
            Some(Token::Symbol(c)) => *c,
            other => panic!("expected a unary operator symbol, found {other:?}"),
        }
    }

    #[must_use]
    pub fn term_unary_operand(&self) -> &Node {
        &self.children()[1]
    }

    #[must_use]
    pub fn term_call_name(&self) -> &str {
        match self.term_kind() {
            TermKind::UnqualifiedCall => self.identifier_at(0),
            TermKind::QualifiedCall => self.identifier_at(2),
            other => panic!("term is not a subroutine call: {other:?}"),
        }
    }

    #[must_use]
    pub fn term_call_qualifier(&self) -> Option<&str> {
        match self.term_kind() {
            TermKind::QualifiedCall => Some(self.identifier_at(0)),
            _ => None,
        }
    }

    #[must_use]
    pub fn term_call_args(&self) -> &Node {
        self.children()
            .iter()
            .find(|n| n.tag() == Some(Tag::ExpressionList))
            .expect("call terms always carry an expressionList")
    }
}
