//! Training-case records and datasets.
//!
//! A [`CaseRecord`] is one row of the tabular dataset. The list-typed fields
//! (`keywords`, `skills`) are stored as JSON text so that rows read from a
//! file are carried through verbatim; typed accessors decode them on demand.

use serde::{Deserialize, Serialize};

/// Column holding the case identifier.
pub const CASE_ID: &str = "case_id";
/// Column holding the scenario text.
pub const CASE_TEXT: &str = "case_text";
/// Column holding the reference solution.
pub const BEST_SOLUTION: &str = "best_solution";
/// Column holding the JSON-encoded keyword list.
pub const KEYWORDS: &str = "keywords";
/// Column holding the JSON-encoded skill list.
pub const SKILLS: &str = "skills";

/// All record fields, in column order.
pub const REQUIRED_FIELDS: [&str; 5] = [CASE_ID, CASE_TEXT, BEST_SOLUTION, KEYWORDS, SKILLS];

/// One assessed skill of a case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skill {
    /// Skill name.
    pub skill: String,
    /// What the evaluator looks at.
    pub criterion: String,
    /// Ordered rubric levels, lowest first.
    #[serde(default)]
    pub rubric: Vec<String>,
    /// Advice for the learner.
    #[serde(default)]
    pub recommendation: String,
}

/// One training case in tabular form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseRecord {
    /// Identifier, e.g. `X5-BARISTA-UPSELL-001`.
    pub case_id: String,
    /// Scenario the learner is confronted with.
    pub case_text: String,
    /// Reference solution.
    pub best_solution: String,
    /// Keyword list as JSON text.
    pub keywords: String,
    /// Skill list as JSON text.
    pub skills: String,
}

impl CaseRecord {
    /// Build a record from typed keyword and skill lists.
    pub fn new(
        case_id: impl Into<String>,
        case_text: impl Into<String>,
        best_solution: impl Into<String>,
        keywords: &[String],
        skills: &[Skill],
    ) -> Result<Self, serde_json::Error> {
        Ok(Self {
            case_id: case_id.into(),
            case_text: case_text.into(),
            best_solution: best_solution.into(),
            keywords: serde_json::to_string(keywords)?,
            skills: serde_json::to_string(skills)?,
        })
    }

    /// Decode the keyword list.
    pub fn keyword_list(&self) -> Result<Vec<String>, serde_json::Error> {
        serde_json::from_str(&self.keywords)
    }

    /// Decode the skill list.
    pub fn skill_list(&self) -> Result<Vec<Skill>, serde_json::Error> {
        serde_json::from_str(&self.skills)
    }

    /// Field value by column name.
    pub fn field(&self, name: &str) -> Option<&str> {
        match name {
            CASE_ID => Some(&self.case_id),
            CASE_TEXT => Some(&self.case_text),
            BEST_SOLUTION => Some(&self.best_solution),
            KEYWORDS => Some(&self.keywords),
            SKILLS => Some(&self.skills),
            _ => None,
        }
    }

    /// The record as a JSON object with decoded list fields.
    ///
    /// List fields that do not hold valid JSON are kept as strings.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value;

        let decode = |raw: &str| serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));

        let mut object = serde_json::Map::new();
        object.insert(CASE_ID.to_string(), Value::String(self.case_id.clone()));
        object.insert(CASE_TEXT.to_string(), Value::String(self.case_text.clone()));
        object.insert(
            BEST_SOLUTION.to_string(),
            Value::String(self.best_solution.clone()),
        );
        object.insert(KEYWORDS.to_string(), decode(&self.keywords));
        object.insert(SKILLS.to_string(), decode(&self.skills));
        Value::Object(object)
    }
}

/// Column arrangement of a dataset file whose header is not exactly the
/// record fields in record order.
///
/// Keeps the original header so that a dataset read from such a file is
/// written back with the same columns, including columns that are not
/// record fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnLayout {
    header: Vec<String>,
    fields: Vec<usize>,
}

impl ColumnLayout {
    /// Create a layout from the file header and the column index of each
    /// record field, in [`REQUIRED_FIELDS`] order.
    pub fn new(header: Vec<String>, fields: Vec<usize>) -> Self {
        Self { header, fields }
    }

    /// The record fields in record order, with no other columns.
    pub fn plain() -> Self {
        Self::new(
            REQUIRED_FIELDS.map(String::from).to_vec(),
            (0..REQUIRED_FIELDS.len()).collect(),
        )
    }

    /// Whether `header` and `fields` describe the plain record layout.
    pub fn is_plain(header: &[String], fields: &[usize]) -> bool {
        header.iter().map(String::as_str).eq(REQUIRED_FIELDS)
            && fields.iter().copied().eq(0..REQUIRED_FIELDS.len())
    }

    /// Column names, in file order.
    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// The record field stored in `column`, if any.
    pub fn field_at(&self, column: usize) -> Option<&'static str> {
        self.fields
            .iter()
            .position(|&index| index == column)
            .map(|field| REQUIRED_FIELDS[field])
    }

    /// Indices of the columns that are not record fields, in file order.
    pub fn extra_columns(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.header.len()).filter(|column| !self.fields.contains(column))
    }
}

/// Ordered collection of case records; row order is file order.
///
/// A dataset read from a file with a non-plain header also carries its
/// [`ColumnLayout`] and, per loaded row, the cells of the extra columns.
/// Records appended later have empty extra cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    records: Vec<CaseRecord>,
    layout: Option<ColumnLayout>,
    extras: Vec<Vec<String>>,
}

impl Dataset {
    /// Create an empty dataset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a dataset that keeps the column layout of its source file.
    ///
    /// `extras[row]` holds the cells of the layout's extra columns for
    /// `records[row]`.
    pub fn with_layout(
        records: Vec<CaseRecord>,
        layout: ColumnLayout,
        extras: Vec<Vec<String>>,
    ) -> Self {
        Self {
            records,
            layout: Some(layout),
            extras,
        }
    }

    /// Column layout of the source file, unless it was the plain one.
    pub fn layout(&self) -> Option<&ColumnLayout> {
        self.layout.as_ref()
    }

    /// Extra-column cells of `row`; empty for rows added after loading.
    pub fn extra_cells(&self, row: usize) -> &[String] {
        self.extras.get(row).map(Vec::as_slice).unwrap_or_default()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset has no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The first record, used as the few-shot example for generation.
    pub fn exemplar(&self) -> Option<&CaseRecord> {
        self.records.first()
    }

    /// Append one record.
    pub fn push(&mut self, record: CaseRecord) {
        self.records.push(record);
    }

    /// All records in order.
    pub fn records(&self) -> &[CaseRecord] {
        &self.records
    }

    /// Iterate over the records in order.
    pub fn iter(&self) -> std::slice::Iter<'_, CaseRecord> {
        self.records.iter()
    }

    /// Concatenate `self` and `new_records`, keeping `self` first.
    pub fn merged(mut self, new_records: impl IntoIterator<Item = CaseRecord>) -> Self {
        self.records.extend(new_records);
        self
    }
}

impl From<Vec<CaseRecord>> for Dataset {
    fn from(records: Vec<CaseRecord>) -> Self {
        Self {
            records,
            ..Self::default()
        }
    }
}

impl FromIterator<CaseRecord> for Dataset {
    fn from_iter<I: IntoIterator<Item = CaseRecord>>(iter: I) -> Self {
        Self::from(iter.into_iter().collect::<Vec<_>>())
    }
}

impl IntoIterator for Dataset {
    type Item = CaseRecord;
    type IntoIter = std::vec::IntoIter<CaseRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a CaseRecord;
    type IntoIter = std::slice::Iter<'a, CaseRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_skill() -> Skill {
        Skill {
            skill: "Sales".to_string(),
            criterion: "Offers a relevant add-on".to_string(),
            rubric: vec!["0 - none".to_string(), "5 - natural upsell".to_string()],
            recommendation: "Practice pairing suggestions".to_string(),
        }
    }

    #[test]
    fn test_record_new_encodes_lists() {
        let record = CaseRecord::new(
            "X5-BARISTA-UPSELL-001",
            "scenario",
            "solution",
            &["upsell".to_string(), "кофе".to_string()],
            &[sample_skill()],
        )
        .expect("lists should serialize");

        assert_eq!(record.keywords, r#"["upsell","кофе"]"#);
        assert_eq!(
            record.keyword_list().expect("valid keywords"),
            vec!["upsell".to_string(), "кофе".to_string()]
        );
        assert_eq!(
            record.skill_list().expect("valid skills"),
            vec![sample_skill()]
        );
    }

    #[test]
    fn test_skill_defaults_optional_fields() {
        let skills: Vec<Skill> =
            serde_json::from_str(r#"[{"skill": "Empathy", "criterion": "Listens"}]"#)
                .expect("should parse");
        assert!(skills[0].rubric.is_empty());
        assert!(skills[0].recommendation.is_empty());
    }

    #[test]
    fn test_field_lookup() {
        let record = CaseRecord::new("X5-IT-QUALITY-002", "text", "solution", &[], &[])
            .expect("should build");
        assert_eq!(record.field(CASE_ID), Some("X5-IT-QUALITY-002"));
        assert_eq!(record.field(KEYWORDS), Some("[]"));
        assert_eq!(record.field("unknown"), None);
    }

    #[test]
    fn test_to_json_decodes_lists() {
        let mut record =
            CaseRecord::new("X5-HR-TRAINING-003", "t", "s", &["hr".to_string()], &[])
                .expect("should build");
        let json = record.to_json();
        assert_eq!(json[KEYWORDS], serde_json::json!(["hr"]));

        record.skills = "not json".to_string();
        assert_eq!(record.to_json()[SKILLS], serde_json::json!("not json"));
    }

    #[test]
    fn test_dataset_merge_keeps_order() {
        let a = CaseRecord::new("X5-A-B-001", "a", "a", &[], &[]).expect("should build");
        let b = CaseRecord::new("X5-A-B-002", "b", "b", &[], &[]).expect("should build");
        let c = CaseRecord::new("X5-A-B-003", "c", "c", &[], &[]).expect("should build");

        let dataset = Dataset::from(vec![a.clone()]).merged(vec![b.clone(), c.clone()]);
        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset.exemplar(), Some(&a));
        assert_eq!(dataset.records(), &[a, b, c]);
    }

    #[test]
    fn test_layout_keeps_extra_cells_through_merge() {
        let header: Vec<String> = ["", "case_id", "case_text", "best_solution", "keywords", "skills", "level"]
            .iter()
            .map(|name| name.to_string())
            .collect();
        let fields = vec![1, 2, 3, 4, 5];
        assert!(!ColumnLayout::is_plain(&header, &fields));
        assert!(ColumnLayout::is_plain(
            &REQUIRED_FIELDS.map(String::from),
            &[0, 1, 2, 3, 4]
        ));

        let layout = ColumnLayout::new(header, fields);
        assert_eq!(layout.field_at(0), None);
        assert_eq!(layout.field_at(1), Some(CASE_ID));
        assert_eq!(layout.extra_columns().collect::<Vec<_>>(), vec![0, 6]);

        let loaded = CaseRecord::new("X5-A-B-001", "a", "a", &[], &[]).expect("should build");
        let added = CaseRecord::new("X5-A-B-002", "b", "b", &[], &[]).expect("should build");
        let dataset = Dataset::with_layout(
            vec![loaded],
            layout.clone(),
            vec![vec!["0".to_string(), "senior".to_string()]],
        )
        .merged(vec![added]);

        assert_eq!(dataset.layout(), Some(&layout));
        assert_eq!(dataset.extra_cells(0), ["0", "senior"]);
        assert!(dataset.extra_cells(1).is_empty());
    }

    #[test]
    fn test_empty_dataset_has_no_exemplar() {
        let dataset = Dataset::new();
        assert!(dataset.is_empty());
        assert!(dataset.exemplar().is_none());
    }
}
