// Tokens of the relational algebra language

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Literals
    Identifier(String),
    Number(String),
    String(String),

    // Relational operators (keyword or symbol form)
    Select,
    Project,
    Rename,
    Union,
    Intersect,
    Difference,
    Times,
    Join,

    // Predicate keywords
    And,
    Or,
    Not,
    True,
    False,

    // Statement keywords
    Create,
    Relation,
    Drop,
    Insert,
    Into,
    Values,
    Delete,
    From,
    Where,
    Update,
    Set,
    Let,
    Explain,
    Primary,
    Key,
    Foreign,
    References,

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Equal,
    NotEqual,
    Less,
    Greater,
    LessEqual,
    GreaterEqual,
    Arrow,

    // Delimiters
    LeftParen,
    RightParen,
    LeftBracket,
    RightBracket,
    Comma,
    Semicolon,
    Dot,

    // Special
    Eof,
}

impl Token {
    /// Check if the token is a keyword
    pub fn is_keyword(&self) -> bool {
        matches!(
            self,
            Token::Select
                | Token::Project
                | Token::Rename
                | Token::Union
                | Token::Intersect
                | Token::Difference
                | Token::Times
                | Token::Join
                | Token::And
                | Token::Or
                | Token::Not
                | Token::True
                | Token::False
                | Token::Create
                | Token::Relation
                | Token::Drop
                | Token::Insert
                | Token::Into
                | Token::Values
                | Token::Delete
                | Token::From
                | Token::Where
                | Token::Update
                | Token::Set
                | Token::Let
                | Token::Explain
                | Token::Primary
                | Token::Key
                | Token::Foreign
                | Token::References
        )
    }

    /// Convert a word to a keyword token if it is one; case-insensitive
    pub fn keyword_from_str(s: &str) -> Option<Token> {
        match s.to_uppercase().as_str() {
            "SELECT" => Some(Token::Select),
            "PROJECT" => Some(Token::Project),
            "RENAME" => Some(Token::Rename),
            "UNION" => Some(Token::Union),
            "INTERSECT" => Some(Token::Intersect),
            "MINUS" | "EXCEPT" => Some(Token::Difference),
            "TIMES" | "CROSS" => Some(Token::Times),
            "JOIN" => Some(Token::Join),
            "AND" => Some(Token::And),
            "OR" => Some(Token::Or),
            "NOT" => Some(Token::Not),
            "TRUE" => Some(Token::True),
            "FALSE" => Some(Token::False),
            "CREATE" => Some(Token::Create),
            "RELATION" => Some(Token::Relation),
            "DROP" => Some(Token::Drop),
            "INSERT" => Some(Token::Insert),
            "INTO" => Some(Token::Into),
            "VALUES" => Some(Token::Values),
            "DELETE" => Some(Token::Delete),
            "FROM" => Some(Token::From),
            "WHERE" => Some(Token::Where),
            "UPDATE" => Some(Token::Update),
            "SET" => Some(Token::Set),
            "LET" => Some(Token::Let),
            "EXPLAIN" => Some(Token::Explain),
            "PRIMARY" => Some(Token::Primary),
            "KEY" => Some(Token::Key),
            "FOREIGN" => Some(Token::Foreign),
            "REFERENCES" => Some(Token::References),
            _ => None,
        }
    }

    /// Single-character symbol forms of operators
    pub fn from_symbol(c: char) -> Option<Token> {
        match c {
            'σ' => Some(Token::Select),
            'π' => Some(Token::Project),
            'ρ' => Some(Token::Rename),
            '∪' => Some(Token::Union),
            '∩' => Some(Token::Intersect),
            '−' => Some(Token::Difference),
            '×' => Some(Token::Times),
            '⋈' => Some(Token::Join),
            '∧' => Some(Token::And),
            '∨' => Some(Token::Or),
            '¬' => Some(Token::Not),
            '≠' => Some(Token::NotEqual),
            '≤' => Some(Token::LessEqual),
            '≥' => Some(Token::GreaterEqual),
            '→' => Some(Token::Arrow),
            _ => None,
        }
    }
}
