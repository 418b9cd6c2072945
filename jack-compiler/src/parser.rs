//! Recursive-descent parser: token stream -> `class` AST.

use crate::ast::{Node, Tag};
use crate::error::JackError;
use crate::token::Token;

const KEYWORD_CONSTANTS: [&str; 4] = ["true", "false", "null", "this"];
const OPERATORS: &str = "+-*/&|<>=";

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    #[must_use]
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    /// Parses a full class declaration, erroring if tokens remain afterward.
    pub fn parse(mut self) -> Result<Node, JackError> {
        let class = self.parse_class()?;
        if self.pos != self.tokens.len() {
            return Err(JackError::syntax("unexpected tokens after class body"));
        }
        Ok(class)
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Result<Token, JackError> {
        let token = self
            .tokens
            .get(self.pos)
            .cloned()
            .ok_or_else(|| JackError::syntax("unexpected end of input"))?;
        self.pos += 1;
        Ok(token)
    }

    fn at_symbol(&self, ch: char) -> bool {
        matches!(self.peek(), Some(Token::Symbol(c)) if *c == ch)
    }

    fn at_keyword(&self, word: &str) -> bool {
        matches!(self.peek(), Some(Token::Keyword(k)) if k == word)
    }

    fn expect_symbol(&mut self, ch: char) -> Result<Token, JackError> {
        let token = self.advance()?;
        match &token {
            Token::Symbol(c) if *c == ch => Ok(token),
            other => Err(JackError::syntax(format!(
                "expected symbol '{ch}', found {other:?}"
            ))),
        }
    }

    fn expect_keyword(&mut self, word: &str) -> Result<Token, JackError> {
        let token = self.advance()?;
        match &token {
            Token::Keyword(k) if k == word => Ok(token),
            other => Err(JackError::syntax(format!(
                "expected keyword '{word}', found {other:?}"
            ))),
        }
    }

    fn expect_identifier(&mut self) -> Result<Token, JackError> {
        let token = self.advance()?;
        match &token {
            Token::Identifier(_) => Ok(token),
            other => Err(JackError::syntax(format!(
                "expected an identifier, found {other:?}"
            ))),
        }
    }

    /// A Jack type: `int` | `char` | `boolean` | a class name.
    fn parse_type(&mut self) -> Result<Token, JackError> {
        let token = self.advance()?;
        match &token {
            Token::Keyword(k) if matches!(k.as_str(), "int" | "char" | "boolean") => Ok(token),
            Token::Identifier(_) => Ok(token),
            other => Err(JackError::syntax(format!(
                "expected a type, found {other:?}"
            ))),
        }
    }

    fn parse_class(&mut self) -> Result<Node, JackError> {
        let mut children = vec![
            Node::Terminal(self.expect_keyword("class")?),
            Node::Terminal(self.expect_identifier()?),
            Node::Terminal(self.expect_symbol('{')?),
        ];
        while self.at_keyword("static") || self.at_keyword("field") {
            children.push(self.parse_class_var_dec()?);
        }
        while self.at_keyword("constructor") || self.at_keyword("function") || self.at_keyword("method")
        {
            children.push(self.parse_subroutine_dec()?);
        }
        children.push(Node::Terminal(self.expect_symbol('}')?));
        Ok(Node::non_terminal(Tag::Class, children))
    }

    fn parse_var_list(&mut self, keyword: &str, tag: Tag) -> Result<Node, JackError> {
        let mut children = vec![
            Node::Terminal(self.expect_keyword(keyword)?),
            Node::Terminal(self.parse_type()?),
            Node::Terminal(self.expect_identifier()?),
        ];
        while self.at_symbol(',') {
            children.push(Node::Terminal(self.expect_symbol(',')?));
            children.push(Node::Terminal(self.expect_identifier()?));
        }
        children.push(Node::Terminal(self.expect_symbol(';')?));
        Ok(Node::non_terminal(tag, children))
    }

    fn parse_class_var_dec(&mut self) -> Result<Node, JackError> {
        let keyword = if self.at_keyword("static") {
            "static"
        } else {
            "field"
        };
        self.parse_var_list(keyword, Tag::ClassVarDec)
    }

    fn parse_var_dec(&mut self) -> Result<Node, JackError> {
        self.parse_var_list("var", Tag::VarDec)
    }

    fn parse_subroutine_dec(&mut self) -> Result<Node, JackError> {
        let kind_keyword = self.advance()?;
        let return_type = match self.peek() {
            Some(Token::Keyword(k)) if k == "void" => Node::Terminal(self.advance()?),
            _ => Node::Terminal(self.parse_type()?),
        };
        let name = Node::Terminal(self.expect_identifier()?);
        let open_paren = Node::Terminal(self.expect_symbol('(')?);
        let params = self.parse_parameter_list()?;
        let close_paren = Node::Terminal(self.expect_symbol(')')?);
        let body = self.parse_subroutine_body()?;
        Ok(Node::non_terminal(
            Tag::SubroutineDec,
            vec![
                Node::Terminal(kind_keyword),
                return_type,
                name,
                open_paren,
                params,
                close_paren,
                body,
            ],
        ))
    }

    fn parse_parameter_list(&mut self) -> Result<Node, JackError> {
        let mut children = Vec::new();
        if !self.at_symbol(')') {
            children.push(Node::Terminal(self.parse_type()?));
            children.push(Node::Terminal(self.expect_identifier()?));
            while self.at_symbol(',') {
                children.push(Node::Terminal(self.expect_symbol(',')?));
                children.push(Node::Terminal(self.parse_type()?));
                children.push(Node::Terminal(self.expect_identifier()?));
            }
        }
        Ok(Node::non_terminal(Tag::ParameterList, children))
    }

    fn parse_subroutine_body(&mut self) -> Result<Node, JackError> {
        let mut children = vec![Node::Terminal(self.expect_symbol('{')?)];
        while self.at_keyword("var") {
            children.push(self.parse_var_dec()?);
        }
        children.push(self.parse_statements()?);
        children.push(Node::Terminal(self.expect_symbol('}')?));
        Ok(Node::non_terminal(Tag::SubroutineBody, children))
    }

    fn at_statement_start(&self) -> bool {
        ["let", "if", "while", "do", "return"]
            .iter()
            .any(|k| self.at_keyword(k))
    }

    fn parse_statements(&mut self) -> Result<Node, JackError> {
        let mut children = Vec::new();
        while self.at_statement_start() {
            children.push(self.parse_statement()?);
        }
        Ok(Node::non_terminal(Tag::Statements, children))
    }

    fn parse_statement(&mut self) -> Result<Node, JackError> {
        if self.at_keyword("let") {
            self.parse_let_statement()
        } else if self.at_keyword("if") {
            self.parse_if_statement()
        } else if self.at_keyword("while") {
            self.parse_while_statement()
        } else if self.at_keyword("do") {
            self.parse_do_statement()
        } else if self.at_keyword("return") {
            self.parse_return_statement()
        } else {
            Err(JackError::syntax(format!(
                "expected a statement, found {:?}",
                self.peek()
            )))
        }
    }

    fn parse_let_statement(&mut self) -> Result<Node, JackError> {
        let mut children = vec![
            Node::Terminal(self.expect_keyword("let")?),
            Node::Terminal(self.expect_identifier()?),
        ];
        if self.at_symbol('[') {
            children.push(Node::Terminal(self.expect_symbol('[')?));
            children.push(self.parse_expression()?);
            children.push(Node::Terminal(self.expect_symbol(']')?));
        }
        children.push(Node::Terminal(self.expect_symbol('=')?));
        children.push(self.parse_expression()?);
        children.push(Node::Terminal(self.expect_symbol(';')?));
        Ok(Node::non_terminal(Tag::LetStatement, children))
    }

    fn parse_if_statement(&mut self) -> Result<Node, JackError> {
        let mut children = vec![
            Node::Terminal(self.expect_keyword("if")?),
            Node::Terminal(self.expect_symbol('(')?),
            self.parse_expression()?,
            Node::Terminal(self.expect_symbol(')')?),
            Node::Terminal(self.expect_symbol('{')?),
            self.parse_statements()?,
            Node::Terminal(self.expect_symbol('}')?),
        ];
        if self.at_keyword("else") {
            children.push(Node::Terminal(self.expect_keyword("else")?));
            children.push(Node::Terminal(self.expect_symbol('{')?));
            children.push(self.parse_statements()?);
            children.push(Node::Terminal(self.expect_symbol('}')?));
        }
        Ok(Node::non_terminal(Tag::IfStatement, children))
    }

    fn parse_while_statement(&mut self) -> Result<Node, JackError> {
        let children = vec![
            Node::Terminal(self.expect_keyword("while")?),
            Node::Terminal(self.expect_symbol('(')?),
            self.parse_expression()?,
            Node::Terminal(self.expect_symbol(')')?),
            Node::Terminal(self.expect_symbol('{')?),
            self.parse_statements()?,
            Node::Terminal(self.expect_symbol('}')?),
        ];
        Ok(Node::non_terminal(Tag::WhileStatement, children))
    }

    fn parse_do_statement(&mut self) -> Result<Node, JackError> {
        let mut children = vec![Node::Terminal(self.expect_keyword("do")?)];
        self.parse_call(&mut children)?;
        children.push(Node::Terminal(self.expect_symbol(';')?));
        Ok(Node::non_terminal(Tag::DoStatement, children))
    }

    fn parse_return_statement(&mut self) -> Result<Node, JackError> {
        let mut children = vec![Node::Terminal(self.expect_keyword("return")?)];
        if !self.at_symbol(';') {
            children.push(self.parse_expression()?);
        }
        children.push(Node::Terminal(self.expect_symbol(';')?));
        Ok(Node::non_terminal(Tag::ReturnStatement, children))
    }

    fn parse_expression(&mut self) -> Result<Node, JackError> {
        let mut children = vec![self.parse_term()?];
        while let Some(Token::Symbol(c)) = self.peek() {
            if !OPERATORS.contains(*c) {
                break;
            }
            children.push(Node::Terminal(self.advance()?));
            children.push(self.parse_term()?);
        }
        Ok(Node::non_terminal(Tag::Expression, children))
    }

    fn parse_term(&mut self) -> Result<Node, JackError> {
        let children = match self.peek() {
            Some(Token::IntConst(_) | Token::StringConst(_)) => {
                vec![Node::Terminal(self.advance()?)]
            }
            Some(Token::Keyword(k)) if KEYWORD_CONSTANTS.contains(&k.as_str()) => {
                vec![Node::Terminal(self.advance()?)]
            }
            Some(Token::Symbol('(')) => vec![
                Node::Terminal(self.expect_symbol('(')?),
                self.parse_expression()?,
                Node::Terminal(self.expect_symbol(')')?),
            ],
            Some(Token::Symbol(c)) if *c == '-' || *c == '~' => {
                vec![Node::Terminal(self.advance()?), self.parse_term()?]
            }
            Some(Token::Identifier(_)) => {
                let name = Node::Terminal(self.advance()?);
                match self.peek() {
                    Some(Token::Symbol('[')) => vec![
                        name,
                        Node::Terminal(self.expect_symbol('[')?),
                        self.parse_expression()?,
                        Node::Terminal(self.expect_symbol(']')?),
                    ],
                    Some(Token::Symbol('(')) => {
                        let mut call = vec![name];
                        self.push_call_tail(&mut call)?;
                        call
                    }
                    Some(Token::Symbol('.')) => {
                        let mut call = vec![name, Node::Terminal(self.expect_symbol('.')?)];
                        call.push(Node::Terminal(self.expect_identifier()?));
                        self.push_call_tail(&mut call)?;
                        call
                    }
                    _ => vec![name],
                }
            }
            other => {
                return Err(JackError::syntax(format!(
                    "expected a term, found {other:?}"
                )));
            }
        };
        Ok(Node::non_terminal(Tag::Term, children))
    }

    /// A subroutine call's identifier(s) have already been consumed and
    /// pushed onto `children`; this parses `'(' expressionList ')'`.
    fn parse_call(&mut self, children: &mut Vec<Node>) -> Result<(), JackError> {
        children.push(Node::Terminal(self.expect_identifier()?));
        if self.at_symbol('.') {
            children.push(Node::Terminal(self.expect_symbol('.')?));
            children.push(Node::Terminal(self.expect_identifier()?));
        }
        self.push_call_tail(children)
    }

    fn push_call_tail(&mut self, children: &mut Vec<Node>) -> Result<(), JackError> {
        children.push(Node::Terminal(self.expect_symbol('(')?));
        children.push(self.parse_expression_list()?);
        children.push(Node::Terminal(self.expect_symbol(')')?));
        Ok(())
    }

    fn parse_expression_list(&mut self) -> Result<Node, JackError> {
        let mut children = Vec::new();
        if !self.at_symbol(')') {
            children.push(self.parse_expression()?);
            while self.at_symbol(',') {
                children.push(Node::Terminal(self.expect_symbol(',')?));
                children.push(self.parse_expression()?);
            }
        }
        Ok(Node::non_terminal(Tag::ExpressionList, children))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::tokenize;

    fn parse_source(src: &str) -> Node {
        Parser::new(tokenize(src).unwrap()).parse().unwrap()
    }

    #[test]
    fn parses_empty_class() {
        let class = parse_source("class Main {\n}\n");
        assert_eq!(class.class_name(), "Main");
        assert_eq!(class.subroutine_decs().count(), 0);
    }

    #[test]
    fn parses_field_and_constructor() {
        let class = parse_source(
            "class Point {\n\
             field int x, y;\n\
             constructor Point new(int ax, int ay) {\n\
               let x = ax;\n\
               let y = ay;\n\
               return this;\n\
             }\n\
             }\n",
        );
        let field = class.class_var_decs().next().unwrap();
        assert_eq!(field.var_kind(), "field");
        assert_eq!(field.var_names(), vec!["x", "y"]);

        let ctor = class.subroutine_decs().next().unwrap();
        assert_eq!(ctor.subroutine_kind(), "constructor");
        assert_eq!(ctor.subroutine_name(), "new");
        assert_eq!(ctor.subroutine_parameters().parameters().len(), 2);
    }

    #[test]
    fn parses_method_call_and_array_index() {
        let class = parse_source(
            "class Main {\n\
             function void run() {\n\
               var Array a;\n\
               do Output.printInt(a[0]);\n\
               return;\n\
             }\n\
             }\n",
        );
        let func = class.subroutine_decs().next().unwrap();
        let statements = func.subroutine_body().body_statements();
        let do_stmt = &statements.statement_list()[0];
        assert_eq!(do_stmt.do_call_qualifier(), Some("Output"));
        assert_eq!(do_stmt.do_call_name(), "printInt");
        assert_eq!(do_stmt.do_call_args().expressions().len(), 1);
    }

    #[test]
    fn parses_expression_with_multiple_operators() {
        let class = parse_source(
            "class Main {\n\
             function void run() {\n\
               do Math.ignore(1 + 2 * 3);\n\
               return;\n\
             }\n\
             }\n",
        );
        let func = class.subroutine_decs().next().unwrap();
        let statements = func.subroutine_body().body_statements();
        let do_stmt = &statements.statement_list()[0];
        let arg = &do_stmt.do_call_args().expressions()[0];
        assert_eq!(arg.expression_terms().len(), 5);
    }

    #[test]
    fn missing_semicolon_is_a_syntax_error() {
        let tokens = tokenize("class Main {\nfunction void run() {\nreturn\n}\n}\n").unwrap();
        let err = Parser::new(tokens).parse().unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::SyntaxError);
    }
}
