// Parser for algebra scripts - converts tokens to statements

use super::ast::*;
use super::error::ParseError;
use super::lexer::Lexer;
use super::token::Token;
use crate::access::{DataType, Value};
use crate::catalog::{ForeignKeyDefinition, RelationDefinition};
use crate::executor::SetOperator;
use crate::expression::{BinaryOperator, ColumnRef, Expression, UnaryOperator};
use log::warn;

type ParseResult<T> = Result<T, ParseError>;

pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
    /// Reject `AND` and `OR` mixed at one level without parentheses
    strict_grouping: bool,
}

impl Parser {
    pub fn new(input: &str) -> ParseResult<Self> {
        let tokens = Lexer::new(input).tokenize()?;
        Ok(Parser {
            tokens,
            position: 0,
            strict_grouping: false,
        })
    }

    pub fn with_strict_grouping(mut self, strict_grouping: bool) -> Self {
        self.strict_grouping = strict_grouping;
        self
    }

    /// Parse every statement of a script. Statements are separated by `;`;
    /// the last one may omit it.
    pub fn parse_script(&mut self) -> ParseResult<Vec<Statement>> {
        let mut statements = Vec::new();
        loop {
            while self.match_token(&Token::Semicolon) {
                self.advance();
            }
            if self.match_token(&Token::Eof) {
                break;
            }
            statements.push(self.parse_statement()?);
            if !self.match_token(&Token::Eof) {
                self.expect_token(Token::Semicolon)?;
            }
        }
        Ok(statements)
    }

    /// Parse a single statement
    pub fn parse_statement(&mut self) -> ParseResult<Statement> {
        match self.current_token() {
            Token::Create => self.parse_create(),
            Token::Drop => self.parse_drop(),
            Token::Insert => self.parse_insert(),
            Token::Delete => self.parse_delete(),
            Token::Update => self.parse_update(),
            Token::Let => self.parse_let(),
            Token::Explain => {
                self.advance();
                Ok(Statement::Explain(self.parse_relation_expression()?))
            }
            _ => Ok(Statement::Query(self.parse_relation_expression()?)),
        }
    }

    /// Parse a complete input holding exactly one relational expression
    pub fn parse_query(&mut self) -> ParseResult<RelationExpression> {
        let expression = self.parse_relation_expression()?;
        if self.match_token(&Token::Semicolon) {
            self.advance();
        }
        self.expect_token(Token::Eof)?;
        Ok(expression)
    }

    /// Parse a complete input holding exactly one predicate
    pub fn parse_predicate(&mut self) -> ParseResult<Expression> {
        let expression = self.parse_expression()?;
        self.expect_token(Token::Eof)?;
        Ok(expression)
    }

    fn parse_create(&mut self) -> ParseResult<Statement> {
        self.expect_token(Token::Create)?;
        self.expect_token(Token::Relation)?;
        let name = self.expect_identifier()?;
        self.expect_token(Token::LeftParen)?;

        let mut definition = RelationDefinition {
            name,
            attributes: Vec::new(),
            primary_key: None,
            foreign_keys: Vec::new(),
        };

        loop {
            match self.current_token() {
                Token::Primary => {
                    self.advance();
                    self.expect_token(Token::Key)?;
                    definition.primary_key = Some(self.parse_parenthesized_identifiers()?);
                }
                Token::Foreign => {
                    self.advance();
                    self.expect_token(Token::Key)?;
                    let attributes = self.parse_parenthesized_identifiers()?;
                    self.expect_token(Token::References)?;
                    let referenced_relation = self.expect_identifier()?;
                    let referenced_attributes = self.parse_parenthesized_identifiers()?;
                    definition.foreign_keys.push(ForeignKeyDefinition {
                        attributes,
                        referenced_relation,
                        referenced_attributes,
                    });
                }
                _ => {
                    let attribute = self.expect_identifier()?;
                    let data_type = self.parse_data_type()?;
                    // Inline single-attribute key: `id INT PRIMARY KEY`
                    if self.match_token(&Token::Primary) {
                        self.advance();
                        self.expect_token(Token::Key)?;
                        definition.primary_key = Some(vec![attribute.clone()]);
                    }
                    definition.attributes.push((attribute, data_type));
                }
            }

            if self.match_token(&Token::Comma) {
                self.advance();
            } else {
                break;
            }
        }

        self.expect_token(Token::RightParen)?;
        Ok(Statement::CreateRelation(definition))
    }

    fn parse_data_type(&mut self) -> ParseResult<DataType> {
        let name = self.expect_identifier()?;
        DataType::from_name(&name).ok_or(ParseError::UnknownDataType(name))
    }

    fn parse_drop(&mut self) -> ParseResult<Statement> {
        self.expect_token(Token::Drop)?;
        self.expect_token(Token::Relation)?;
        Ok(Statement::DropRelation(self.expect_identifier()?))
    }

    fn parse_insert(&mut self) -> ParseResult<Statement> {
        self.expect_token(Token::Insert)?;
        self.expect_token(Token::Into)?;
        let relation = self.expect_identifier()?;
        self.expect_token(Token::Values)?;

        let mut rows = Vec::new();
        loop {
            self.expect_token(Token::LeftParen)?;
            rows.push(self.parse_expression_list()?);
            self.expect_token(Token::RightParen)?;
            if self.match_token(&Token::Comma) {
                self.advance();
            } else {
                break;
            }
        }

        Ok(Statement::Insert { relation, rows })
    }

    fn parse_delete(&mut self) -> ParseResult<Statement> {
        self.expect_token(Token::Delete)?;
        self.expect_token(Token::From)?;
        let relation = self.expect_identifier()?;
        let predicate = self.parse_where_clause()?;
        Ok(Statement::Delete {
            relation,
            predicate,
        })
    }

    fn parse_update(&mut self) -> ParseResult<Statement> {
        self.expect_token(Token::Update)?;
        let relation = self.expect_identifier()?;
        self.expect_token(Token::Set)?;

        let mut assignments = Vec::new();
        loop {
            let attribute = self.expect_identifier()?;
            self.expect_token(Token::Equal)?;
            let value = self.parse_expression()?;
            assignments.push((attribute, value));
            if self.match_token(&Token::Comma) {
                self.advance();
            } else {
                break;
            }
        }

        let predicate = self.parse_where_clause()?;
        Ok(Statement::Update {
            relation,
            assignments,
            predicate,
        })
    }

    fn parse_where_clause(&mut self) -> ParseResult<Option<Expression>> {
        if self.match_token(&Token::Where) {
            self.advance();
            Ok(Some(self.parse_expression()?))
        } else {
            Ok(None)
        }
    }

    fn parse_let(&mut self) -> ParseResult<Statement> {
        self.expect_token(Token::Let)?;
        let name = self.expect_identifier()?;
        self.expect_token(Token::Equal)?;
        let expression = self.parse_relation_expression()?;
        Ok(Statement::Let { name, expression })
    }

    // Relational expressions, loosest binding first

    /// Parse `union` / `minus` level
    pub fn parse_relation_expression(&mut self) -> ParseResult<RelationExpression> {
        let mut left = self.parse_intersection()?;

        loop {
            let operator = match self.current_token() {
                Token::Union => SetOperator::Union,
                Token::Difference | Token::Minus => SetOperator::Difference,
                _ => break,
            };
            self.advance();
            let right = self.parse_intersection()?;
            left = RelationExpression::set_operation(operator, left, right);
        }

        Ok(left)
    }

    fn parse_intersection(&mut self) -> ParseResult<RelationExpression> {
        let mut left = self.parse_join()?;

        while self.match_token(&Token::Intersect) {
            self.advance();
            let right = self.parse_join()?;
            left = RelationExpression::set_operation(SetOperator::Intersect, left, right);
        }

        Ok(left)
    }

    fn parse_join(&mut self) -> ParseResult<RelationExpression> {
        let mut left = self.parse_relation_operand()?;

        loop {
            match self.current_token() {
                Token::Times => {
                    self.advance();
                    let right = self.parse_relation_operand()?;
                    left = RelationExpression::product(left, right);
                }
                Token::Join => {
                    self.advance();
                    let condition = if self.match_token(&Token::LeftBracket) {
                        Some(self.parse_bracketed_predicate()?)
                    } else {
                        None
                    };
                    let right = self.parse_relation_operand()?;
                    left = RelationExpression::join(condition, left, right);
                }
                _ => break,
            }
        }

        Ok(left)
    }

    /// Parse a unary operator application, a parenthesized expression or a
    /// relation name
    fn parse_relation_operand(&mut self) -> ParseResult<RelationExpression> {
        match self.current_token() {
            Token::Select => {
                self.advance();
                let predicate = self.parse_bracketed_predicate()?;
                let input = self.parse_relation_operand()?;
                Ok(RelationExpression::select(predicate, input))
            }
            Token::Project => {
                self.advance();
                self.expect_token(Token::LeftBracket)?;
                let mut attributes = vec![self.parse_column_ref()?];
                while self.match_token(&Token::Comma) {
                    self.advance();
                    attributes.push(self.parse_column_ref()?);
                }
                self.expect_token(Token::RightBracket)?;
                let input = self.parse_relation_operand()?;
                Ok(RelationExpression::project(attributes, input))
            }
            Token::Rename => {
                self.advance();
                let renaming = self.parse_renaming()?;
                let input = self.parse_relation_operand()?;
                Ok(RelationExpression::Rename {
                    renaming,
                    input: Box::new(input),
                })
            }
            Token::LeftParen => {
                self.advance();
                let expression = self.parse_relation_expression()?;
                self.expect_token(Token::RightParen)?;
                Ok(expression)
            }
            Token::Identifier(name) => {
                self.advance();
                Ok(RelationExpression::Relation(name))
            }
            other => Err(unexpected("relation expression", &other)),
        }
    }

    fn parse_renaming(&mut self) -> ParseResult<Renaming> {
        self.expect_token(Token::LeftBracket)?;
        let first = self.parse_column_ref()?;

        if first.qualifier.is_none() && self.match_token(&Token::RightBracket) {
            self.advance();
            return Ok(Renaming::Relation(first.name));
        }

        self.expect_token(Token::Arrow)?;
        let mut renames = vec![(first, self.expect_identifier()?)];
        while self.match_token(&Token::Comma) {
            self.advance();
            let old = self.parse_column_ref()?;
            self.expect_token(Token::Arrow)?;
            renames.push((old, self.expect_identifier()?));
        }
        self.expect_token(Token::RightBracket)?;
        Ok(Renaming::Attributes(renames))
    }

    fn parse_bracketed_predicate(&mut self) -> ParseResult<Expression> {
        self.expect_token(Token::LeftBracket)?;
        let predicate = self.parse_expression()?;
        self.expect_token(Token::RightBracket)?;
        Ok(predicate)
    }

    // Predicates

    fn parse_expression(&mut self) -> ParseResult<Expression> {
        self.parse_or()
    }

    /// Parse OR expression
    fn parse_or(&mut self) -> ParseResult<Expression> {
        let (mut left, mut mixed) = self.parse_and()?;
        let mut has_or = false;

        while self.match_token(&Token::Or) {
            self.advance();
            let (right, right_has_and) = self.parse_and()?;
            mixed |= right_has_and;
            has_or = true;
            left = Expression::or(left, right);
        }

        if has_or && mixed {
            if self.strict_grouping {
                return Err(ParseError::MixedLogicalOperators(left.to_string()));
            }
            warn!(
                "AND and OR mixed without parentheses in `{}`; AND binds tighter",
                left
            );
        }

        Ok(left)
    }

    /// Parse AND expression; also reports whether an AND was seen
    fn parse_and(&mut self) -> ParseResult<(Expression, bool)> {
        let mut left = self.parse_not()?;
        let mut has_and = false;

        while self.match_token(&Token::And) {
            self.advance();
            let right = self.parse_not()?;
            left = Expression::and(left, right);
            has_and = true;
        }

        Ok((left, has_and))
    }

    /// Parse NOT expression
    fn parse_not(&mut self) -> ParseResult<Expression> {
        if self.match_token(&Token::Not) {
            self.advance();
            let operand = self.parse_not()?;
            Ok(Expression::not_expr(operand))
        } else {
            self.parse_comparison()
        }
    }

    /// Parse comparison expression
    fn parse_comparison(&mut self) -> ParseResult<Expression> {
        let left = self.parse_addition()?;

        let op = match self.current_token() {
            Token::Equal => BinaryOperator::Eq,
            Token::NotEqual => BinaryOperator::Ne,
            Token::Less => BinaryOperator::Lt,
            Token::LessEqual => BinaryOperator::Le,
            Token::Greater => BinaryOperator::Gt,
            Token::GreaterEqual => BinaryOperator::Ge,
            _ => return Ok(left),
        };
        self.advance();
        let right = self.parse_addition()?;
        Ok(Expression::binary_op(op, left, right))
    }

    /// Parse addition/subtraction expression
    fn parse_addition(&mut self) -> ParseResult<Expression> {
        let mut left = self.parse_multiplication()?;

        loop {
            let op = match self.current_token() {
                Token::Plus => BinaryOperator::Add,
                Token::Minus => BinaryOperator::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_multiplication()?;
            left = Expression::binary_op(op, left, right);
        }

        Ok(left)
    }

    /// Parse multiplication/division expression
    fn parse_multiplication(&mut self) -> ParseResult<Expression> {
        let mut left = self.parse_unary()?;

        loop {
            let op = match self.current_token() {
                Token::Star => BinaryOperator::Mul,
                Token::Slash => BinaryOperator::Div,
                _ => break,
            };
            self.advance();
            let right = self.parse_unary()?;
            left = Expression::binary_op(op, left, right);
        }

        Ok(left)
    }

    /// Parse unary minus
    fn parse_unary(&mut self) -> ParseResult<Expression> {
        if !self.match_token(&Token::Minus) {
            return self.parse_primary();
        }
        self.advance();

        // Fold the sign into an integer literal so i32::MIN is expressible
        if let Token::Number(n) = self.current_token() {
            self.advance();
            let literal = format!("-{}", n);
            return literal
                .parse::<i32>()
                .map(Expression::literal)
                .map_err(|_| ParseError::InvalidNumber(literal));
        }

        let operand = self.parse_unary()?;
        Ok(Expression::unary_op(UnaryOperator::Minus, operand))
    }

    /// Parse primary expression
    fn parse_primary(&mut self) -> ParseResult<Expression> {
        match self.current_token() {
            Token::Number(n) => {
                self.advance();
                n.parse::<i32>()
                    .map(Expression::literal)
                    .map_err(|_| ParseError::InvalidNumber(n))
            }
            Token::String(s) => {
                self.advance();
                Ok(Expression::literal(Value::String(s)))
            }
            Token::True => {
                self.advance();
                Ok(Expression::literal(true))
            }
            Token::False => {
                self.advance();
                Ok(Expression::literal(false))
            }
            Token::LeftParen => {
                self.advance();
                let expression = self.parse_expression()?;
                self.expect_token(Token::RightParen)?;
                Ok(expression)
            }
            Token::Identifier(_) => Ok(Expression::ColumnRef(self.parse_column_ref()?)),
            other => Err(unexpected("expression", &other)),
        }
    }

    /// Parse `name` or `qualifier.name`
    fn parse_column_ref(&mut self) -> ParseResult<ColumnRef> {
        let first = self.expect_identifier()?;
        if self.match_token(&Token::Dot) {
            self.advance();
            let name = self.expect_identifier()?;
            Ok(ColumnRef::qualified(first, name))
        } else {
            Ok(ColumnRef::new(first))
        }
    }

    fn parse_expression_list(&mut self) -> ParseResult<Vec<Expression>> {
        let mut expressions = vec![self.parse_expression()?];
        while self.match_token(&Token::Comma) {
            self.advance();
            expressions.push(self.parse_expression()?);
        }
        Ok(expressions)
    }

    fn parse_parenthesized_identifiers(&mut self) -> ParseResult<Vec<String>> {
        self.expect_token(Token::LeftParen)?;
        let mut identifiers = vec![self.expect_identifier()?];
        while self.match_token(&Token::Comma) {
            self.advance();
            identifiers.push(self.expect_identifier()?);
        }
        self.expect_token(Token::RightParen)?;
        Ok(identifiers)
    }

    // Helper methods

    /// Get current token
    fn current_token(&self) -> Token {
        self.tokens
            .get(self.position)
            .cloned()
            .unwrap_or(Token::Eof)
    }

    /// Advance to next token
    fn advance(&mut self) {
        if self.position + 1 < self.tokens.len() {
            self.position += 1;
        }
    }

    /// Check if current token matches
    fn match_token(&self, token: &Token) -> bool {
        self.current_token() == *token
    }

    /// Expect a specific token
    fn expect_token(&mut self, token: Token) -> ParseResult<()> {
        let current = self.current_token();
        if current == token {
            self.advance();
            Ok(())
        } else {
            Err(unexpected(&format!("{:?}", token), &current))
        }
    }

    /// Expect an identifier
    fn expect_identifier(&mut self) -> ParseResult<String> {
        match self.current_token() {
            Token::Identifier(name) => {
                self.advance();
                Ok(name)
            }
            other => Err(unexpected("identifier", &other)),
        }
    }
}

fn unexpected(expected: &str, found: &Token) -> ParseError {
    ParseError::UnexpectedToken {
        expected: expected.to_string(),
        found: format!("{:?}", found),
    }
}

/// Parse a script with default options
pub fn parse_script(input: &str) -> ParseResult<Vec<Statement>> {
    Parser::new(input)?.parse_script()
}

/// Parse a single predicate, e.g. `country = 'USA' AND year > 1990`
pub fn parse_predicate(input: &str) -> ParseResult<Expression> {
    Parser::new(input)?.parse_predicate()
}

/// Parse a single relational expression
pub fn parse_query(input: &str) -> ParseResult<RelationExpression> {
    Parser::new(input)?.parse_query()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn col(reference: &str) -> Expression {
        Expression::column(reference)
    }

    #[test]
    fn test_parse_select() {
        let expr = parse_query("select[country = 'USA'](Artist)").unwrap();
        assert_eq!(
            expr,
            RelationExpression::select(
                Expression::eq(col("country"), Expression::literal("USA")),
                RelationExpression::relation("Artist"),
            )
        );
    }

    #[test]
    fn test_unicode_equals_keywords() {
        let ascii = parse_query("project[name](select[year > 1990 and not active](A join B))")
            .unwrap();
        let unicode = parse_query("π[name](σ[year > 1990 ∧ ¬active](A ⋈ B))").unwrap();
        assert_eq!(ascii, unicode);

        let ascii = parse_query("R union S minus T intersect U times V").unwrap();
        let unicode = parse_query("R ∪ S − T ∩ U × V").unwrap();
        assert_eq!(ascii, unicode);
    }

    #[test]
    fn test_relational_precedence() {
        // R ∪ (S ∩ (T ⋈ U))
        let expr = parse_query("R union S intersect T join U").unwrap();
        assert_eq!(
            expr,
            RelationExpression::set_operation(
                SetOperator::Union,
                RelationExpression::relation("R"),
                RelationExpression::set_operation(
                    SetOperator::Intersect,
                    RelationExpression::relation("S"),
                    RelationExpression::join(
                        None,
                        RelationExpression::relation("T"),
                        RelationExpression::relation("U"),
                    ),
                ),
            )
        );

        // Left-associative: (R − S) ∪ T
        let expr = parse_query("R - S union T").unwrap();
        assert_eq!(
            expr,
            RelationExpression::set_operation(
                SetOperator::Union,
                RelationExpression::set_operation(
                    SetOperator::Difference,
                    RelationExpression::relation("R"),
                    RelationExpression::relation("S"),
                ),
                RelationExpression::relation("T"),
            )
        );
    }

    #[test]
    fn test_theta_join_and_rename() {
        let expr =
            parse_query("rename[E1](Employee) join[E1.manager = E2.id] rename[E2](Employee)")
                .unwrap();
        match expr {
            RelationExpression::Join {
                condition: Some(condition),
                left,
                right,
            } => {
                assert_eq!(condition, Expression::eq(col("E1.manager"), col("E2.id")));
                assert!(matches!(
                    *left,
                    RelationExpression::Rename {
                        renaming: Renaming::Relation(ref n),
                        ..
                    } if n == "E1"
                ));
                assert!(matches!(*right, RelationExpression::Rename { .. }));
            }
            other => panic!("unexpected {:?}", other),
        }

        let expr = parse_query("ρ[year → formed, Artist.name -> artist](Artist)").unwrap();
        assert_eq!(
            expr,
            RelationExpression::Rename {
                renaming: Renaming::Attributes(vec![
                    (ColumnRef::new("year"), "formed".to_string()),
                    (ColumnRef::qualified("Artist", "name"), "artist".to_string()),
                ]),
                input: Box::new(RelationExpression::relation("Artist")),
            }
        );
    }

    #[test]
    fn test_predicate_precedence() {
        // a OR (b AND (NOT c))
        let expr = parse_predicate("a or b and not c").unwrap();
        assert_eq!(
            expr,
            Expression::or(col("a"), Expression::and(col("b"), Expression::not_expr(col("c"))))
        );

        // Comparison binds looser than arithmetic
        let expr = parse_predicate("x + 2 * y >= -3").unwrap();
        assert_eq!(
            expr,
            Expression::ge(
                Expression::add_expr(
                    col("x"),
                    Expression::mul_expr(Expression::literal(2), col("y"))
                ),
                Expression::literal(-3),
            )
        );
    }

    #[test]
    fn test_strict_grouping() {
        let mut parser = Parser::new("a = 1 and b = 2 or c = 3")
            .unwrap()
            .with_strict_grouping(true);
        assert!(matches!(
            parser.parse_predicate(),
            Err(ParseError::MixedLogicalOperators(_))
        ));

        // Parenthesized groups are fine
        let mut parser = Parser::new("(a = 1 and b = 2) or c = 3")
            .unwrap()
            .with_strict_grouping(true);
        assert!(parser.parse_predicate().is_ok());

        // Without strict grouping the mix parses, AND binding tighter
        assert!(parse_predicate("a = 1 and b = 2 or c = 3").is_ok());
    }

    #[test]
    fn test_integer_bounds() {
        assert_eq!(
            parse_predicate("-2147483648").unwrap(),
            Expression::literal(i32::MIN)
        );
        assert_eq!(
            parse_predicate("2147483648"),
            Err(ParseError::InvalidNumber("2147483648".to_string()))
        );
    }

    #[test]
    fn test_parse_script() {
        let script = "
            CREATE RELATION Artist (name VARCHAR, year INT, country VARCHAR, PRIMARY KEY (name));
            CREATE RELATION Album (title VARCHAR PRIMARY KEY, artist VARCHAR,
                FOREIGN KEY (artist) REFERENCES Artist (name));
            INSERT INTO Artist VALUES ('GZA', 1991, 'USA'), ('Oasis', 1991, 'UK');
            DELETE FROM Artist WHERE country = 'UK';
            UPDATE Artist SET year = year + 1 WHERE name = 'GZA';
            LET Usa = select[country = 'USA'](Artist);
            EXPLAIN Usa;
            DROP RELATION Album;
            project[name](Usa)
        ";
        let statements = parse_script(script).unwrap();
        assert_eq!(statements.len(), 9);

        match &statements[1] {
            Statement::CreateRelation(definition) => {
                assert_eq!(definition.primary_key, Some(vec!["title".to_string()]));
                assert_eq!(definition.foreign_keys.len(), 1);
                assert_eq!(definition.foreign_keys[0].referenced_relation, "Artist");
            }
            other => panic!("unexpected {:?}", other),
        }
        match &statements[2] {
            Statement::Insert { relation, rows } => {
                assert_eq!(relation, "Artist");
                assert_eq!(rows.len(), 2);
                assert_eq!(rows[1][2], Expression::literal("UK"));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(&statements[4], Statement::Update { assignments, predicate: Some(_), .. } if assignments.len() == 1));
        assert!(matches!(&statements[5], Statement::Let { name, .. } if name == "Usa"));
        assert!(matches!(&statements[6], Statement::Explain(_)));
        assert_eq!(statements[7], Statement::DropRelation("Album".to_string()));
        assert!(matches!(&statements[8], Statement::Query(_)));
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            parse_query("select[a = 1]"),
            Err(ParseError::UnexpectedToken { .. })
        ));
        assert!(matches!(
            parse_query("project[](R)"),
            Err(ParseError::UnexpectedToken { .. })
        ));
        assert!(matches!(
            parse_script("CREATE RELATION R (a FLOAT)"),
            Err(ParseError::UnknownDataType(_))
        ));
        assert!(matches!(
            parse_script("R S"),
            Err(ParseError::UnexpectedToken { .. })
        ));
    }
}
