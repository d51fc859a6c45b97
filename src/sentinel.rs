//! Serde adapters for the sentinel strings the backend uses in place of null.
//!
//! Use with `#[serde(default, with = "crate::sentinel::na")]` on an
//! `Option<String>` field. Empty strings are also read as `None`.

macro_rules! sentinel_module {
    ($name:ident, $sentinel:literal) => {
        #[doc = concat!("Maps the sentinel `\"", $sentinel, "\"` to `None` and back.")]
        pub mod $name {
            use serde::{Deserialize, Deserializer, Serializer};

            /// The string written in place of a missing value.
            pub const SENTINEL: &str = $sentinel;

            /// Serialize `None` as the sentinel string.
            pub fn serialize<S>(value: &Option<String>, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: Serializer,
            {
                serializer.serialize_str(value.as_deref().unwrap_or(SENTINEL))
            }

            /// Deserialize the sentinel string, an empty string or null as `None`.
            pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
            where
                D: Deserializer<'de>,
            {
                let raw = Option::<String>::deserialize(deserializer)?;

                Ok(raw.filter(|value| {
                    let value = value.trim();
                    !value.is_empty() && value != SENTINEL
                }))
            }
        }
    };
}

sentinel_module!(na, "NA");
sentinel_module!(no, "NO");

#[cfg(test)]
mod sentinel_tests {
    use serde::{Deserialize, Serialize};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Payment {
        #[serde(default, with = "super::na")]
        utr_no: Option<String>,
        #[serde(default, with = "super::no")]
        note: Option<String>,
    }

    #[test]
    fn reads_sentinels_as_none() {
        let got: Payment = serde_json::from_str(r#"{"utrNo":"NA","note":"NO"}"#).unwrap();

        assert_eq!(
            got,
            Payment {
                utr_no: None,
                note: None
            }
        );
    }

    #[test]
    fn reads_missing_null_and_empty_as_none() {
        let got: Payment = serde_json::from_str(r#"{"utrNo":null,"note":"  "}"#).unwrap();

        assert_eq!(
            got,
            Payment {
                utr_no: None,
                note: None
            }
        );

        let got: Payment = serde_json::from_str("{}").unwrap();

        assert_eq!(
            got,
            Payment {
                utr_no: None,
                note: None
            }
        );
    }

    #[test]
    fn keeps_real_values() {
        let got: Payment =
            serde_json::from_str(r#"{"utrNo":"UTR123","note":"NA"}"#).unwrap();

        assert_eq!(got.utr_no.as_deref(), Some("UTR123"));
        // "NA" is only a sentinel for fields that use it.
        assert_eq!(got.note.as_deref(), Some("NA"));
    }

    #[test]
    fn writes_sentinels_for_none() {
        let payment = Payment {
            utr_no: None,
            note: None,
        };

        let got = serde_json::to_string(&payment).unwrap();

        assert_eq!(got, r#"{"utrNo":"NA","note":"NO"}"#);
    }
}
