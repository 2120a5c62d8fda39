use std::path::PathBuf;

use trackwise::error::{exit_codes, Error, JsonError};

#[test]
fn user_errors_exit_with_two() {
    let errors = [
        Error::InvalidArgument("bad".into()),
        Error::validation("title", "too short"),
        Error::InvalidConfig("nope".into()),
        Error::TaskNotFound("abc".into()),
        Error::ChecklistItemNotFound("abc".into()),
        Error::TemplateNotFound("abc".into()),
        Error::AmbiguousId {
            prefix: "a".into(),
            count: 2,
        },
    ];
    for err in &errors {
        assert_eq!(err.exit_code(), exit_codes::USER_ERROR, "{err}");
        assert_eq!(err.kind(), "user_error");
    }
}

#[test]
fn operation_failures_exit_with_four() {
    let io = Error::Io(std::io::Error::new(std::io::ErrorKind::Other, "disk"));
    let lock = Error::LockFailed(PathBuf::from("/tmp/state.json.lock"));
    let failed = Error::OperationFailed("boom".into());
    for err in [&io, &lock, &failed] {
        assert_eq!(err.exit_code(), exit_codes::OPERATION_FAILED);
        assert_eq!(err.kind(), "operation_failed");
    }
}

#[test]
fn json_error_carries_structured_details() -> Result<(), Box<dyn std::error::Error>> {
    let err = Error::validation("title", "must be at least 3 characters");
    let value = serde_json::to_value(JsonError::from(&err))?;
    assert_eq!(value["code"], 2);
    assert_eq!(value["details"]["field"], "title");
    assert!(value["error"]
        .as_str()
        .is_some_and(|text| text.contains("title")));

    let ambiguous = Error::AmbiguousId {
        prefix: "ab".into(),
        count: 3,
    };
    let value = serde_json::to_value(JsonError::from(&ambiguous))?;
    assert_eq!(value["details"]["prefix"], "ab");
    assert_eq!(value["details"]["matches"], 3);

    let plain = Error::OperationFailed("boom".into());
    let value = serde_json::to_value(JsonError::from(&plain))?;
    assert!(value.get("details").is_none());
    assert_eq!(value["code"], 4);
    Ok(())
}
