use safety_assist_app::data::JsonOperationalData;
use safety_assist_tools::sanitizer::{label_for, EnumDomain};
use safety_assist_tools::Locale;
use serde_json::Value;

const SAMPLE: &str = include_str!("../config/data/sample.json");

#[test]
fn test_sample_data_parses() {
    assert!(JsonOperationalData::from_json_str(SAMPLE).is_ok());
}

#[test]
fn test_sample_codes_have_labels_in_every_locale() {
    let data: Value = serde_json::from_str(SAMPLE).unwrap();
    let organizations = data["organizations"].as_object().unwrap();
    let mut checked = 0;

    for org in organizations.values() {
        for list in org.as_object().unwrap().values() {
            let Some(records) = list.as_array() else {
                continue;
            };
            for record in records {
                for (key, domain) in [
                    ("status", EnumDomain::Status),
                    ("severity", EnumDomain::Severity),
                    ("category", EnumDomain::Category),
                    ("priority", EnumDomain::Priority),
                ] {
                    let Some(code) = record.get(key).and_then(Value::as_str) else {
                        continue;
                    };
                    for locale in Locale::ALL {
                        assert!(
                            label_for(domain, locale, code).is_some(),
                            "{} code {} has no {} label",
                            key,
                            code,
                            locale
                        );
                    }
                    checked += 1;
                }
            }
        }
    }

    assert!(checked > 0);
}
