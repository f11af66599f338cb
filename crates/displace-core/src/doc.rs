//! Dependency-parsed document graph.
//!
//! The external parser (tokenization, POS tagging, dependency parsing,
//! sentence segmentation and named-entity recognition are all out of scope)
//! produces one [`ParsedDocument`] per article: a token arena plus sentence
//! boundaries, named-entity spans and noun-chunk spans. Documents are
//! immutable once built and serializable, so a parser running in another
//! process can hand them over as JSON.
//!
//! [`Token`] and [`Span`] are cheap index-based handles borrowing the
//! document; they expose the traversal surface the extraction engine needs
//! (head, children, ancestors, subtree) without any token owning another.

use serde::{Deserialize, Serialize};

use crate::{DisplaceError, Result};

// ============================================================================
// Label inventories
// ============================================================================

/// Coarse part-of-speech tag (Universal Dependencies inventory).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Pos {
    Adj,
    Adp,
    Adv,
    Aux,
    Cconj,
    Det,
    Intj,
    Noun,
    Num,
    Part,
    Pron,
    Propn,
    Punct,
    Sconj,
    Sym,
    Verb,
    X,
}

/// Dependency relation from a token to its syntactic head.
///
/// Labels the parser must supply at minimum; anything outside this
/// inventory deserializes to [`DepRel::Other`] rather than failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DepRel {
    Acomp,
    Advcl,
    Advmod,
    Agent,
    Amod,
    Appos,
    Attr,
    Aux,
    AuxPass,
    Cc,
    Ccomp,
    Compound,
    Conj,
    Csubj,
    CsubjPass,
    Dative,
    Det,
    Dobj,
    Expl,
    Iobj,
    Mark,
    Neg,
    Nsubj,
    NsubjPass,
    Nummod,
    Oprd,
    Pcomp,
    Pobj,
    Poss,
    Prep,
    Prt,
    Punct,
    Quantmod,
    RelCl,
    Root,
    Xcomp,
    #[serde(other)]
    Other,
}

impl DepRel {
    /// Subject roles (used when collecting a verb's subjects).
    pub fn is_subject(self) -> bool {
        matches!(
            self,
            Self::Nsubj | Self::NsubjPass | Self::Csubj | Self::CsubjPass
        )
    }

    /// Object roles (used when collecting a verb's objects).
    pub fn is_object(self) -> bool {
        matches!(self, Self::Attr | Self::Dobj | Self::Dative | Self::Oprd)
    }

    /// Auxiliary roles; a verb in one of these is not a main verb.
    pub fn is_aux(self) -> bool {
        matches!(self, Self::Aux | Self::AuxPass)
    }
}

/// Named-entity label. Only place and date entities matter to the engine;
/// everything else collapses to `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityLabel {
    #[serde(rename = "GPE")]
    Gpe,
    #[serde(rename = "DATE")]
    Date,
    #[serde(other)]
    Other,
}

// ============================================================================
// Token storage
// ============================================================================

/// Stored attributes of one parse node. Immutable once the document is built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenData {
    pub text: String,
    pub lemma: String,
    pub pos: Pos,
    /// Fine-grained tag (Penn Treebank style, e.g. "NNS").
    #[serde(default)]
    pub tag: String,
    pub dep: DepRel,
    /// Index of the syntactic head; the root token points at itself.
    pub head: usize,
    /// Character offset of the token within the document text.
    pub idx: usize,
    /// Parser's numeral flag ("five", "5,000", ...).
    #[serde(default)]
    pub like_num: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct EntitySpan {
    start: usize,
    end: usize,
    label: EntityLabel,
}

// ============================================================================
// ParsedDocument
// ============================================================================

/// A fully parsed article: token arena, sentence boundaries, named-entity
/// spans and noun-chunk spans. All span ranges are half-open token index
/// ranges; all character offsets are document-absolute.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawDocument")]
pub struct ParsedDocument {
    text: String,
    tokens: Vec<TokenData>,
    sentences: Vec<(usize, usize)>,
    entities: Vec<EntitySpan>,
    noun_chunks: Vec<(usize, usize)>,
}

/// Unchecked mirror of [`ParsedDocument`], the deserialization target.
/// Conversion runs the same validation as [`DocBuilder::build`], so a
/// malformed JSON document fails at the boundary instead of panicking or
/// looping during extraction.
#[derive(Deserialize)]
struct RawDocument {
    text: String,
    tokens: Vec<TokenData>,
    sentences: Vec<(usize, usize)>,
    entities: Vec<EntitySpan>,
    noun_chunks: Vec<(usize, usize)>,
}

impl TryFrom<RawDocument> for ParsedDocument {
    type Error = DisplaceError;

    fn try_from(raw: RawDocument) -> Result<Self> {
        let doc = ParsedDocument {
            text: raw.text,
            tokens: raw.tokens,
            sentences: raw.sentences,
            entities: raw.entities,
            noun_chunks: raw.noun_chunks,
        };
        doc.validate()?;
        Ok(doc)
    }
}

impl ParsedDocument {
    /// Heads in range and acyclic, span ranges within the arena, character
    /// offsets within the text on char boundaries.
    fn validate(&self) -> Result<()> {
        let n = self.tokens.len();
        for (i, t) in self.tokens.iter().enumerate() {
            if t.head >= n {
                return Err(DisplaceError::MalformedDocument(format!(
                    "token {i} has head {} but document has {n} tokens",
                    t.head
                )));
            }
            let end = t.idx + t.text.len();
            if end > self.text.len()
                || !self.text.is_char_boundary(t.idx)
                || !self.text.is_char_boundary(end)
            {
                return Err(DisplaceError::MalformedDocument(format!(
                    "token {i} offset {} does not fit the document text",
                    t.idx
                )));
            }
        }
        // Only the self-headed root may terminate a head chain; a chain
        // longer than the token count has revisited a token.
        for i in 0..n {
            let mut cur = i;
            let mut steps = 0;
            while self.tokens[cur].head != cur {
                cur = self.tokens[cur].head;
                steps += 1;
                if steps > n {
                    return Err(DisplaceError::MalformedDocument(format!(
                        "head cycle through token {i}"
                    )));
                }
            }
        }
        for &(start, end) in &self.sentences {
            if start >= end || end > n {
                return Err(DisplaceError::MalformedDocument(format!(
                    "sentence span {start}..{end} out of range"
                )));
            }
        }
        for e in &self.entities {
            if e.start >= e.end || e.end > n {
                return Err(DisplaceError::MalformedDocument(format!(
                    "entity span {}..{} out of range",
                    e.start, e.end
                )));
            }
        }
        for &(start, end) in &self.noun_chunks {
            if start >= end || end > n {
                return Err(DisplaceError::MalformedDocument(format!(
                    "noun chunk {start}..{end} out of range"
                )));
            }
        }
        Ok(())
    }

    /// The raw article text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Number of tokens in the document.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Handle to the token at index `i`. Panics if out of range.
    pub fn token(&self, i: usize) -> Token<'_> {
        assert!(i < self.tokens.len(), "token index out of range");
        Token { doc: self, i }
    }

    /// All tokens in document order.
    pub fn tokens(&self) -> impl Iterator<Item = Token<'_>> {
        (0..self.tokens.len()).map(move |i| Token { doc: self, i })
    }

    /// Sentence spans in document order.
    pub fn sentences(&self) -> impl Iterator<Item = Span<'_>> {
        self.sentences.iter().map(move |&(start, end)| Span {
            doc: self,
            start,
            end,
            label: None,
        })
    }

    /// Named-entity spans in document order.
    pub fn entities(&self) -> impl Iterator<Item = Span<'_>> {
        self.entities.iter().map(move |e| Span {
            doc: self,
            start: e.start,
            end: e.end,
            label: Some(e.label),
        })
    }

    /// Noun-chunk spans in document order.
    pub fn noun_chunks(&self) -> impl Iterator<Item = Span<'_>> {
        self.noun_chunks.iter().map(move |&(start, end)| Span {
            doc: self,
            start,
            end,
            label: None,
        })
    }

    /// An arbitrary unlabeled span over `start..end` token indices.
    pub fn span(&self, start: usize, end: usize) -> Span<'_> {
        assert!(start <= end && end <= self.tokens.len(), "span out of range");
        Span {
            doc: self,
            start,
            end,
            label: None,
        }
    }

    fn data(&self, i: usize) -> &TokenData {
        &self.tokens[i]
    }
}

// ============================================================================
// Token handle
// ============================================================================

/// Cheap handle to one token of a [`ParsedDocument`].
#[derive(Clone, Copy)]
pub struct Token<'a> {
    doc: &'a ParsedDocument,
    i: usize,
}

impl<'a> Token<'a> {
    /// Position index within the document.
    pub fn i(&self) -> usize {
        self.i
    }

    /// The owning document.
    pub fn doc(&self) -> &'a ParsedDocument {
        self.doc
    }

    pub fn text(&self) -> &'a str {
        &self.doc.data(self.i).text
    }

    pub fn lemma(&self) -> &'a str {
        &self.doc.data(self.i).lemma
    }

    pub fn pos(&self) -> Pos {
        self.doc.data(self.i).pos
    }

    /// Fine-grained tag (e.g. "NNS" for plural nouns).
    pub fn tag(&self) -> &'a str {
        &self.doc.data(self.i).tag
    }

    pub fn dep(&self) -> DepRel {
        self.doc.data(self.i).dep
    }

    pub fn like_num(&self) -> bool {
        self.doc.data(self.i).like_num
    }

    /// Character offset of the first character of this token.
    pub fn idx(&self) -> usize {
        self.doc.data(self.i).idx
    }

    /// Character offset one past the last character of this token.
    pub fn end_idx(&self) -> usize {
        self.idx() + self.text().len()
    }

    /// The syntactic head. The sentence root is its own head.
    pub fn head(&self) -> Token<'a> {
        Token {
            doc: self.doc,
            i: self.doc.data(self.i).head,
        }
    }

    /// Direct dependents, in document order.
    pub fn children(&self) -> impl Iterator<Item = Token<'a>> + 'a {
        let doc = self.doc;
        let i = self.i;
        (0..doc.tokens.len())
            .filter(move |&j| j != i && doc.data(j).head == i)
            .map(move |j| Token { doc, i: j })
    }

    /// Direct dependents preceding this token.
    pub fn lefts(&self) -> impl Iterator<Item = Token<'a>> + 'a {
        let i = self.i;
        self.children().filter(move |t| t.i < i)
    }

    /// Direct dependents following this token.
    pub fn rights(&self) -> impl Iterator<Item = Token<'a>> + 'a {
        let i = self.i;
        self.children().filter(move |t| t.i > i)
    }

    /// The chain of heads up to the sentence root, nearest first.
    pub fn ancestors(&self) -> Ancestors<'a> {
        Ancestors {
            doc: self.doc,
            cur: self.i,
        }
    }

    /// True if this token appears on `other`'s ancestor chain (strict).
    pub fn is_ancestor_of(&self, other: Token<'a>) -> bool {
        other.ancestors().any(|t| t.i == self.i)
    }

    /// This token and all of its descendants, in document order.
    pub fn subtree(&self) -> Vec<Token<'a>> {
        self.doc
            .tokens()
            .filter(|t| t.i == self.i || self.is_ancestor_of(*t))
            .collect()
    }
}

impl PartialEq for Token<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.doc, other.doc) && self.i == other.i
    }
}

impl Eq for Token<'_> {}

impl std::fmt::Debug for Token<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Token({}, {:?})", self.i, self.text())
    }
}

/// Iterator over a token's head chain. Stops at the root (self-headed).
pub struct Ancestors<'a> {
    doc: &'a ParsedDocument,
    cur: usize,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        let head = self.doc.data(self.cur).head;
        if head == self.cur {
            return None;
        }
        self.cur = head;
        Some(Token {
            doc: self.doc,
            i: head,
        })
    }
}

// ============================================================================
// Span handle
// ============================================================================

/// Contiguous token range of a [`ParsedDocument`], optionally labeled
/// (named-entity spans carry their label; sentences and noun chunks do not).
#[derive(Clone, Copy)]
pub struct Span<'a> {
    doc: &'a ParsedDocument,
    start: usize,
    end: usize,
    label: Option<EntityLabel>,
}

impl<'a> Span<'a> {
    /// First token index (inclusive).
    pub fn start(&self) -> usize {
        self.start
    }

    /// One past the last token index.
    pub fn end(&self) -> usize {
        self.end
    }

    pub fn label(&self) -> Option<EntityLabel> {
        self.label
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn doc(&self) -> &'a ParsedDocument {
        self.doc
    }

    /// Tokens of the span in document order.
    pub fn tokens(&self) -> impl Iterator<Item = Token<'a>> + 'a {
        let doc = self.doc;
        (self.start..self.end).map(move |i| Token { doc, i })
    }

    /// True if the token index falls within the span.
    pub fn contains(&self, token: Token<'a>) -> bool {
        token.i >= self.start && token.i < self.end
    }

    /// Character offset of the span's first token.
    pub fn start_char(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            self.doc.data(self.start).idx
        }
    }

    /// Character offset one past the span's last token.
    pub fn end_char(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            self.doc.token(self.end - 1).end_idx()
        }
    }

    /// The underlying slice of document text.
    pub fn text(&self) -> &'a str {
        if self.is_empty() {
            ""
        } else {
            &self.doc.text[self.start_char()..self.end_char()]
        }
    }

    /// Space-joined lemmas of the span's tokens.
    pub fn lemma(&self) -> String {
        self.tokens()
            .map(|t| t.lemma())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// The syntactic head of the span: the token whose own head lies
    /// outside the span (or is itself).
    pub fn root(&self) -> Token<'a> {
        assert!(!self.is_empty(), "empty span has no root");
        for i in self.start..self.end {
            let head = self.doc.data(i).head;
            if head == i || head < self.start || head >= self.end {
                return Token { doc: self.doc, i };
            }
        }
        // Cyclic heads inside the span; fall back to the first token.
        Token {
            doc: self.doc,
            i: self.start,
        }
    }

    /// Named entities lying entirely within this span.
    pub fn entities(&self) -> impl Iterator<Item = Span<'a>> + 'a {
        let (start, end) = (self.start, self.end);
        self.doc
            .entities()
            .filter(move |e| e.start >= start && e.end <= end)
    }

    /// Noun chunks lying entirely within this span.
    pub fn noun_chunks(&self) -> impl Iterator<Item = Span<'a>> + 'a {
        let (start, end) = (self.start, self.end);
        self.doc
            .noun_chunks()
            .filter(move |c| c.start >= start && c.end <= end)
    }
}

impl std::fmt::Debug for Span<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Span({}..{}, {:?})", self.start, self.end, self.text())
    }
}

// ============================================================================
// DocBuilder
// ============================================================================

/// Construction API for [`ParsedDocument`], used by parser adapters and by
/// test fixtures. Character offsets are derived by single-space joining,
/// with no space before punctuation tokens.
#[derive(Debug, Default)]
pub struct DocBuilder {
    text: String,
    tokens: Vec<TokenData>,
    sentences: Vec<(usize, usize)>,
    sent_start: usize,
    entities: Vec<EntitySpan>,
    noun_chunks: Vec<(usize, usize)>,
}

impl DocBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a token. `head` is the absolute index of its syntactic head
    /// (its own index for the sentence root).
    pub fn token(
        mut self,
        text: &str,
        lemma: &str,
        pos: Pos,
        tag: &str,
        dep: DepRel,
        head: usize,
    ) -> Self {
        let space = !self.text.is_empty() && pos != Pos::Punct;
        if space {
            self.text.push(' ');
        }
        let idx = self.text.len();
        self.text.push_str(text);
        self.tokens.push(TokenData {
            text: text.to_string(),
            lemma: lemma.to_string(),
            pos,
            tag: tag.to_string(),
            dep,
            head,
            idx,
            like_num: false,
        });
        self
    }

    /// Append a numeral token (POS NUM, tag CD, numeral flag set).
    pub fn num(self, text: &str, dep: DepRel, head: usize) -> Self {
        let mut b = self.token(text, text, Pos::Num, "CD", dep, head);
        b.tokens.last_mut().expect("token just pushed").like_num = true;
        b
    }

    /// Append a punctuation token (attaches flush to the previous token).
    pub fn punct(self, text: &str, head: usize) -> Self {
        self.token(text, text, Pos::Punct, text, DepRel::Punct, head)
    }

    /// Close the current sentence at the last appended token.
    pub fn sent(mut self) -> Self {
        if self.sent_start < self.tokens.len() {
            self.sentences.push((self.sent_start, self.tokens.len()));
            self.sent_start = self.tokens.len();
        }
        self
    }

    /// Mark a named-entity span over `start..end` token indices.
    pub fn entity(mut self, start: usize, end: usize, label: EntityLabel) -> Self {
        self.entities.push(EntitySpan { start, end, label });
        self
    }

    /// Mark a noun-chunk span over `start..end` token indices.
    pub fn chunk(mut self, start: usize, end: usize) -> Self {
        self.noun_chunks.push((start, end));
        self
    }

    /// Validate and finish. A trailing unclosed sentence is closed.
    pub fn build(mut self) -> Result<ParsedDocument> {
        if self.sent_start < self.tokens.len() {
            self = self.sent();
        }
        let doc = ParsedDocument {
            text: self.text,
            tokens: self.tokens,
            sentences: self.sentences,
            entities: self.entities,
            noun_chunks: self.noun_chunks,
        };
        doc.validate()?;
        Ok(doc)
    }
}

// ============================================================================
// Tests
// ============================================================================
