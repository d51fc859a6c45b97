//! Case-insensitive substring search over a closed set of record fields.
//!
//! Each record type declares which [SearchField]s it supports through the
//! [Searchable] trait. A [SearchSpec] is checked against that list when it is
//! built, so a field the record does not have is rejected up front instead of
//! silently matching nothing at lookup time.

use std::{borrow::Cow, fmt, str::FromStr};

use serde::{Deserialize, Deserializer};

use crate::Error;

/// A record attribute that can be searched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchField {
    /// The holder's or member's full name.
    Name,
    /// The account number of a savings or deposit account.
    AccountNumber,
    /// The mobile phone number.
    Mobile,
    /// The loan application number.
    ApplicationNumber,
    /// Match if any of the record's searchable fields match.
    All,
}

impl SearchField {
    /// The value used for this field in query strings and `<select>` options.
    pub fn as_query_value(self) -> &'static str {
        match self {
            SearchField::Name => "name",
            SearchField::AccountNumber => "accountNumber",
            SearchField::Mobile => "mobile",
            SearchField::ApplicationNumber => "applicationNo",
            SearchField::All => "all",
        }
    }

    /// A human readable label, e.g. for the "Search by ..." placeholder.
    pub fn label(self) -> &'static str {
        match self {
            SearchField::Name => "Name",
            SearchField::AccountNumber => "Account Number",
            SearchField::Mobile => "Mobile",
            SearchField::ApplicationNumber => "Application No.",
            SearchField::All => "Application No., Name or Mobile",
        }
    }
}

impl fmt::Display for SearchField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_query_value())
    }
}

impl FromStr for SearchField {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "name" => Ok(SearchField::Name),
            "accountNumber" => Ok(SearchField::AccountNumber),
            "mobile" => Ok(SearchField::Mobile),
            "applicationNo" => Ok(SearchField::ApplicationNumber),
            "all" => Ok(SearchField::All),
            other => Err(Error::UnknownSearchField(other.to_owned())),
        }
    }
}

impl<'de> Deserialize<'de> for SearchField {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// A record whose string attributes can be searched.
pub trait Searchable {
    /// The fields a [SearchSpec] may name for this record type.
    ///
    /// Must not contain [SearchField::All], which is handled by
    /// [SearchSpec] itself.
    const SEARCH_FIELDS: &'static [SearchField];

    /// The value of `field` for this record, or `None` if the record has no
    /// value for it (including sentinel values such as "NA").
    fn search_value(&self, field: SearchField) -> Option<Cow<'_, str>>;
}

/// The settled search term and the field it is matched against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchSpec {
    term: String,
    field: SearchField,
}

impl SearchSpec {
    /// Create a search spec for records of type `R`.
    ///
    /// # Errors
    ///
    /// Returns [Error::UnsupportedSearchField] if `R` does not declare `field`
    /// in [Searchable::SEARCH_FIELDS].
    pub fn new<R: Searchable>(term: impl Into<String>, field: SearchField) -> Result<Self, Error> {
        if field != SearchField::All && !R::SEARCH_FIELDS.contains(&field) {
            return Err(Error::UnsupportedSearchField(field));
        }

        Ok(Self {
            term: term.into(),
            field,
        })
    }

    /// The raw search term as entered.
    pub fn term(&self) -> &str {
        &self.term
    }

    /// The field being searched.
    pub fn field(&self) -> SearchField {
        self.field
    }

    /// Whether the term is empty or only whitespace, in which case every
    /// record matches.
    pub fn is_blank(&self) -> bool {
        self.term.trim().is_empty()
    }

    /// Whether `record` matches this spec.
    pub fn matches<R: Searchable>(&self, record: &R) -> bool {
        if self.is_blank() {
            return true;
        }

        let needle = self.term.to_lowercase();
        let field_matches = |field: SearchField| {
            record
                .search_value(field)
                .is_some_and(|value| value.to_lowercase().contains(&needle))
        };

        match self.field {
            SearchField::All => R::SEARCH_FIELDS.iter().copied().any(field_matches),
            field => field_matches(field),
        }
    }
}

/// Return the records matching `spec`, keeping their original relative order.
pub fn filter_records<R: Searchable + Clone>(records: &[R], spec: &SearchSpec) -> Vec<R> {
    records
        .iter()
        .filter(|record| spec.matches(*record))
        .cloned()
        .collect()
}

/// The search as sent by a page's search form, e.g. `?q=amit&field=name`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SearchQuery {
    /// The search term.
    #[serde(default)]
    pub q: String,
    /// The query value of a [SearchField]. Blank means the page's default field.
    #[serde(default)]
    pub field: String,
}

impl SearchQuery {
    /// Build the [SearchSpec] for records of type `R`, searching
    /// `default_field` if no field was given.
    ///
    /// # Errors
    ///
    /// Returns [Error::UnknownSearchField] or [Error::UnsupportedSearchField]
    /// if the field is not one `R` can be searched by.
    pub fn into_spec<R: Searchable>(self, default_field: SearchField) -> Result<SearchSpec, Error> {
        let field = match self.field.trim() {
            "" => default_field,
            field => field.parse()?,
        };

        SearchSpec::new::<R>(self.q, field)
    }
}

#[cfg(test)]
mod search_tests {
    use std::borrow::Cow;

    use crate::Error;

    use super::{SearchField, SearchQuery, SearchSpec, Searchable, filter_records};

    #[derive(Debug, Clone, PartialEq)]
    struct Holder {
        id: u32,
        name: String,
        mobile: Option<String>,
    }

    impl Searchable for Holder {
        const SEARCH_FIELDS: &'static [SearchField] = &[SearchField::Name, SearchField::Mobile];

        fn search_value(&self, field: SearchField) -> Option<Cow<'_, str>> {
            match field {
                SearchField::Name => Some(Cow::Borrowed(&self.name)),
                SearchField::Mobile => self.mobile.as_deref().map(Cow::Borrowed),
                _ => None,
            }
        }
    }

    fn holder(id: u32, name: &str, mobile: Option<&str>) -> Holder {
        Holder {
            id,
            name: name.to_owned(),
            mobile: mobile.map(str::to_owned),
        }
    }

    fn holders() -> Vec<Holder> {
        vec![
            holder(1, "Amit", Some("9876500001")),
            holder(2, "Sunita", Some("9123400002")),
            holder(3, "Prasun Rao", None),
        ]
    }

    #[test]
    fn empty_term_is_identity() {
        let records = holders();

        for term in ["", "   ", "\t"] {
            let spec = SearchSpec::new::<Holder>(term, SearchField::Name).unwrap();
            assert_eq!(filter_records(&records, &spec), records);
        }
    }

    #[test]
    fn matches_case_insensitive_substring() {
        let records = holders();
        let spec = SearchSpec::new::<Holder>("sun", SearchField::Name).unwrap();

        let got = filter_records(&records, &spec);

        assert_eq!(got, vec![records[1].clone(), records[2].clone()]);
    }

    #[test]
    fn result_contains_exactly_the_matching_records() {
        let records = holders();

        for term in ["a", "A", "it", "rao", "zz", "9"] {
            let spec = SearchSpec::new::<Holder>(term, SearchField::Name).unwrap();
            let got = filter_records(&records, &spec);

            for record in &records {
                let should_match = record.name.to_lowercase().contains(&term.to_lowercase());
                assert_eq!(
                    got.contains(record),
                    should_match,
                    "term {term:?} and record {record:?}"
                );
            }
        }
    }

    #[test]
    fn end_to_end_name_search() {
        let records = vec![holder(1, "Amit", None), holder(2, "Sunita", None)];
        let spec = SearchSpec::new::<Holder>("sun", SearchField::Name).unwrap();

        let got = filter_records(&records, &spec);

        assert_eq!(got.iter().map(|h| h.id).collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn missing_value_never_matches_non_empty_term() {
        let records = holders();
        let spec = SearchSpec::new::<Holder>("9", SearchField::Mobile).unwrap();

        let got = filter_records(&records, &spec);

        assert_eq!(got.iter().map(|h| h.id).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn all_matches_any_declared_field() {
        let records = holders();
        let spec = SearchSpec::new::<Holder>("00002", SearchField::All).unwrap();

        let got = filter_records(&records, &spec);

        assert_eq!(got, vec![records[1].clone()]);
    }

    #[test]
    fn rejects_field_the_record_does_not_have() {
        let result = SearchSpec::new::<Holder>("x", SearchField::AccountNumber);

        assert_eq!(
            result,
            Err(Error::UnsupportedSearchField(SearchField::AccountNumber))
        );
    }

    #[test]
    fn parses_query_values() {
        for field in [
            SearchField::Name,
            SearchField::AccountNumber,
            SearchField::Mobile,
            SearchField::ApplicationNumber,
            SearchField::All,
        ] {
            assert_eq!(field.as_query_value().parse::<SearchField>(), Ok(field));
        }

        assert_eq!(
            "email".parse::<SearchField>(),
            Err(Error::UnknownSearchField("email".to_owned()))
        );
    }

    #[test]
    fn query_falls_back_to_default_field() {
        let query = SearchQuery {
            q: "ami".to_owned(),
            field: String::new(),
        };

        let spec = query.into_spec::<Holder>(SearchField::Name).unwrap();

        assert_eq!(spec.field(), SearchField::Name);
        assert_eq!(spec.term(), "ami");
    }

    #[test]
    fn query_rejects_unknown_field() {
        let query = SearchQuery {
            q: "ami".to_owned(),
            field: "balance".to_owned(),
        };

        assert_eq!(
            query.into_spec::<Holder>(SearchField::Name),
            Err(Error::UnknownSearchField("balance".to_owned()))
        );
    }
}
