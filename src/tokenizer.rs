//! Lexical analysis: turns the raw input string into tokens on demand.
//!
//! The tokenizer knows nothing about semantics beyond recognising keywords,
//! punctuators and literals. Two-character punctuators are matched before
//! single-character ones. Tokens are produced lazily; [`TokenStream`] adds
//! the single token of lookahead the parser needs.

/// Kinds of tokens recognised by the front-end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
  // keywords
  Let,
  Const,
  Fn,
  Return,
  True,
  False,
  And,
  Or,
  If,
  Else,
  For,
  Break,
  Continue,
  As,
  Struct,
  Enum,
  Trait,
  Impl,
  Pub,
  Static,
  Constructor,
  // literals and names
  Ident,
  Num,
  Float,
  Str,
  // punctuators
  Plus,
  Minus,
  Star,
  Slash,
  Percent,
  Eq,
  Ne,
  Lt,
  Gt,
  Le,
  Ge,
  Assign,
  Not,
  LParen,
  RParen,
  LBrace,
  RBrace,
  LBracket,
  RBracket,
  Comma,
  Semicolon,
  Colon,
  ColonColon,
  Arrow,
  Dot,
  Hash,
  Amp,
  Eof,
}

fn keyword(text: &str) -> Option<TokenKind> {
  let kind = match text {
    "let" => TokenKind::Let,
    "const" => TokenKind::Const,
    "fn" => TokenKind::Fn,
    "return" => TokenKind::Return,
    "true" => TokenKind::True,
    "false" => TokenKind::False,
    "and" => TokenKind::And,
    "or" => TokenKind::Or,
    "if" => TokenKind::If,
    "else" => TokenKind::Else,
    "for" => TokenKind::For,
    "break" => TokenKind::Break,
    "continue" => TokenKind::Continue,
    "as" => TokenKind::As,
    "struct" => TokenKind::Struct,
    "enum" => TokenKind::Enum,
    "trait" => TokenKind::Trait,
    "impl" => TokenKind::Impl,
    "pub" => TokenKind::Pub,
    "static" => TokenKind::Static,
    "constructor" => TokenKind::Constructor,
    _ => return None,
  };
  Some(kind)
}

/// Lexical information needed by later stages.
///
/// `text` is the lexeme, except for string literals where it holds the
/// unescaped contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
  pub kind: TokenKind,
  pub text: String,
  pub line: usize,
  pub col: usize,
}

impl Token {
  pub fn new(kind: TokenKind, text: impl Into<String>, line: usize, col: usize) -> Self {
    Self {
      kind,
      text: text.into(),
      line,
      col,
    }
  }

  pub fn is(&self, kind: TokenKind) -> bool {
    self.kind == kind
  }
}

/// Human-friendly description used in diagnostics.
pub fn describe_token(token: &Token) -> &str {
  match token.kind {
    TokenKind::Eof if token.text.is_empty() => "EOF",
    _ => &token.text,
  }
}

/// Scanner over an immutable source buffer.
#[derive(Debug, Clone)]
pub struct Lexer<'a> {
  source: &'a str,
  pos: usize,
  line: usize,
  col: usize,
}

impl<'a> Lexer<'a> {
  pub fn new(source: &'a str) -> Self {
    Self {
      source,
      pos: 0,
      line: 1,
      col: 1,
    }
  }

  fn peek_char(&self) -> Option<char> {
    self.source[self.pos..].chars().next()
  }

  fn peek_second(&self) -> Option<char> {
    self.source[self.pos..].chars().nth(1)
  }

  fn bump(&mut self) -> Option<char> {
    let c = self.peek_char()?;
    self.pos += c.len_utf8();
    if c == '\n' {
      self.line += 1;
      self.col = 1;
    } else {
      self.col += 1;
    }
    Some(c)
  }

  fn skip_trivia(&mut self) {
    while let Some(c) = self.peek_char() {
      if c == '/' && self.peek_second() == Some('/') {
        while self.peek_char().is_some_and(|c| c != '\n') {
          self.bump();
        }
        continue;
      }
      if !c.is_whitespace() {
        break;
      }
      self.bump();
    }
  }

  /// Produce the next token; an exhausted buffer yields `Eof` forever.
  pub fn next_token(&mut self) -> Token {
    self.skip_trivia();
    let (line, col) = (self.line, self.col);
    let Some(c) = self.peek_char() else {
      return Token::new(TokenKind::Eof, "", line, col);
    };

    if c == '"' {
      return self.string(line, col);
    }
    if c.is_ascii_alphabetic() || c == '_' {
      return self.ident(line, col);
    }
    if c.is_ascii_digit() {
      return self.number(line, col);
    }

    if let Some((op, kind)) = [
      ("->", TokenKind::Arrow),
      ("==", TokenKind::Eq),
      ("!=", TokenKind::Ne),
      ("<=", TokenKind::Le),
      (">=", TokenKind::Ge),
      ("::", TokenKind::ColonColon),
    ]
    .into_iter()
    .find(|(op, _)| self.source[self.pos..].starts_with(op))
    {
      self.bump();
      self.bump();
      return Token::new(kind, op, line, col);
    }

    self.bump();
    let kind = match c {
      '+' => TokenKind::Plus,
      '-' => TokenKind::Minus,
      '*' => TokenKind::Star,
      '/' => TokenKind::Slash,
      '%' => TokenKind::Percent,
      '=' => TokenKind::Assign,
      '!' => TokenKind::Not,
      '<' => TokenKind::Lt,
      '>' => TokenKind::Gt,
      '(' => TokenKind::LParen,
      ')' => TokenKind::RParen,
      '{' => TokenKind::LBrace,
      '}' => TokenKind::RBrace,
      '[' => TokenKind::LBracket,
      ']' => TokenKind::RBracket,
      ',' => TokenKind::Comma,
      ';' => TokenKind::Semicolon,
      ':' => TokenKind::Colon,
      '.' => TokenKind::Dot,
      '#' => TokenKind::Hash,
      '&' => TokenKind::Amp,
      _ => {
        // Unknown characters end the stream but keep their text.
        tracing::warn!(line, col, ch = %c, "unrecognized character folded into end of stream");
        TokenKind::Eof
      }
    };
    Token::new(kind, c.to_string(), line, col)
  }

  fn ident(&mut self, line: usize, col: usize) -> Token {
    let start = self.pos;
    while self
      .peek_char()
      .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
    {
      self.bump();
    }
    let text = &self.source[start..self.pos];
    let kind = keyword(text).unwrap_or(TokenKind::Ident);
    Token::new(kind, text, line, col)
  }

  fn number(&mut self, line: usize, col: usize) -> Token {
    let start = self.pos;
    while self.peek_char().is_some_and(|c| c.is_ascii_digit()) {
      self.bump();
    }
    let mut kind = TokenKind::Num;
    if self.peek_char() == Some('.') && self.peek_second().is_some_and(|c| c.is_ascii_digit()) {
      kind = TokenKind::Float;
      self.bump();
      while self.peek_char().is_some_and(|c| c.is_ascii_digit()) {
        self.bump();
      }
    }
    Token::new(kind, &self.source[start..self.pos], line, col)
  }

  fn string(&mut self, line: usize, col: usize) -> Token {
    self.bump();
    let mut value = String::new();
    while let Some(c) = self.bump() {
      match c {
        '"' => break,
        '\\' => match self.bump() {
          Some('n') => value.push('\n'),
          Some('r') => value.push('\r'),
          Some('t') => value.push('\t'),
          Some(other) => value.push(other),
          None => break,
        },
        _ => value.push(c),
      }
    }
    Token::new(TokenKind::Str, value, line, col)
  }
}

/// Lazy cursor over the lexer with one token of lookahead.
#[derive(Debug)]
pub struct TokenStream<'a> {
  lexer: Lexer<'a>,
  current: Token,
  lookahead: Option<Token>,
}

impl<'a> TokenStream<'a> {
  pub fn new(source: &'a str) -> Self {
    let mut lexer = Lexer::new(source);
    let current = lexer.next_token();
    Self {
      lexer,
      current,
      lookahead: None,
    }
  }

  pub fn current(&self) -> &Token {
    &self.current
  }

  pub fn at(&self, kind: TokenKind) -> bool {
    self.current.is(kind)
  }

  /// The token after `current`, without consuming anything.
  pub fn peek(&mut self) -> &Token {
    let lexer = &mut self.lexer;
    self.lookahead.get_or_insert_with(|| lexer.next_token())
  }

  /// Move to the next token, returning the one just left behind.
  pub fn advance(&mut self) -> Token {
    let next = match self.lookahead.take() {
      Some(token) => token,
      None => self.lexer.next_token(),
    };
    tracing::trace!(kind = ?next.kind, text = %next.text, line = next.line, "token");
    std::mem::replace(&mut self.current, next)
  }

  pub fn is_eof(&self) -> bool {
    self.at(TokenKind::Eof)
  }
}
