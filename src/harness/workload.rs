use crate::common::{
    concurrent::constants::{ALPHABET_BASE, MAX_ALPHABET_SIZE},
    error::HarnessError,
};

/// A batch of strings to insert and a batch of strings to query.
///
/// Every engine under test consumes the same workload, so the `i`-th entry of
/// each engine's result vector answers the same query.
///
/// Strings cannot contain line breaks, so that the text format used by
/// [`Workload::to_text`] always reads back unchanged.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Workload {
    label: String,
    inserts: Vec<String>,
    queries: Vec<String>,
}

impl Workload {
    /// Creates a workload. Line breaks in `label` are replaced with spaces.
    ///
    /// # Errors
    ///
    /// Fails with [`HarnessError::LineBreak`] if an insert or query string
    /// contains `'\n'` or `'\r'`.
    pub fn new(
        label: impl Into<String>,
        inserts: Vec<String>,
        queries: Vec<String>,
    ) -> Result<Self, HarnessError> {
        check_line_breaks("insert", &inserts)?;
        check_line_breaks("query", &queries)?;
        Ok(Self::from_parts(label, inserts, queries))
    }

    /// Creates a workload from strings known to be free of line breaks.
    pub(crate) fn from_parts(
        label: impl Into<String>,
        inserts: Vec<String>,
        queries: Vec<String>,
    ) -> Self {
        let label = label.into().replace(['\r', '\n'], " ");
        Self {
            label,
            inserts,
            queries,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn inserts(&self) -> &[String] {
        &self.inserts
    }

    pub fn queries(&self) -> &[String] {
        &self.queries
    }

    /// Returns the smallest alphabet, starting at `'a'`, that covers every byte
    /// of the inserted and queried strings.
    ///
    /// The result is clamped to `1..=26`; bytes outside `'a'..='z'` are left
    /// for the engines to reject.
    pub fn alphabet_size(&self) -> usize {
        self.inserts
            .iter()
            .chain(&self.queries)
            .flat_map(|s| s.bytes())
            .map(|b| b.saturating_sub(ALPHABET_BASE) as usize + 1)
            .max()
            .unwrap_or(1)
            .min(MAX_ALPHABET_SIZE)
    }

    /// Serializes the workload.
    ///
    /// The first line is the label, the second line is
    /// `<insert_count> <query_count>`, followed by one insert string per line
    /// and then one query string per line.
    pub fn to_text(&self) -> String {
        let len = self.label.len()
            + 32
            + self
                .inserts
                .iter()
                .chain(&self.queries)
                .map(|s| s.len() + 1)
                .sum::<usize>();

        let mut text = String::with_capacity(len);
        text.push_str(&self.label);
        text.push('\n');
        text.push_str(&format!("{} {}\n", self.inserts.len(), self.queries.len()));
        for s in self.inserts.iter().chain(&self.queries) {
            text.push_str(s);
            text.push('\n');
        }
        text
    }

    /// Parses a workload written by [`Workload::to_text`].
    ///
    /// Blank lines after the last query are ignored.
    pub fn from_text(text: &str) -> Result<Self, HarnessError> {
        let mut lines = text.lines().enumerate().map(|(i, line)| (i + 1, line));

        let (_, label) = lines
            .next()
            .ok_or_else(|| HarnessError::parse(1, "missing label"))?;

        let (line_no, header) = lines
            .next()
            .ok_or_else(|| HarnessError::parse(2, "missing `<insert_count> <query_count>`"))?;
        let (num_inserts, num_queries) = parse_header(line_no, header)?;

        // `first_line` is where the first of the `n` strings is expected.
        let mut take = |n: usize,
                        first_line: usize,
                        what: &str|
         -> Result<Vec<String>, HarnessError> {
            let strings: Vec<String> = lines.by_ref().take(n).map(|(_, s)| s.to_string()).collect();
            if strings.len() < n {
                return Err(HarnessError::parse(
                    first_line.saturating_add(strings.len()),
                    format!("expected {n} {what} strings, found {}", strings.len()),
                ));
            }
            Ok(strings)
        };
        let inserts = take(num_inserts, line_no + 1, "insert")?;
        let queries = take(num_queries, (line_no + 1).saturating_add(num_inserts), "query")?;

        if let Some((line_no, _)) = lines.find(|(_, line)| !line.trim().is_empty()) {
            return Err(HarnessError::parse(line_no, "unexpected content after the queries"));
        }
        // `lines` keeps a lone '\r', which `to_text` could not write back.
        check_line_breaks("insert", &inserts)?;
        check_line_breaks("query", &queries)?;

        Ok(Self {
            label: label.to_string(),
            inserts,
            queries,
        })
    }
}

fn check_line_breaks(sequence: &'static str, strings: &[String]) -> Result<(), HarnessError> {
    match strings.iter().position(|s| s.contains(['\r', '\n'])) {
        Some(index) => Err(HarnessError::LineBreak { sequence, index }),
        None => Ok(()),
    }
}

fn parse_header(line_no: usize, header: &str) -> Result<(usize, usize), HarnessError> {
    let mut fields = header.split_whitespace().map(str::parse::<usize>);
    match (fields.next(), fields.next(), fields.next()) {
        (Some(Ok(inserts)), Some(Ok(queries)), None) => Ok((inserts, queries)),
        _ => Err(HarnessError::parse(
            line_no,
            format!("expected `<insert_count> <query_count>`, found `{header}`"),
        )),
    }
}
