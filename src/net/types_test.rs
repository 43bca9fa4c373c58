use super::*;

// =============================================================
// Helpers
// =============================================================

fn user_json(role: &str) -> serde_json::Value {
    serde_json::json!({
        "id": 7,
        "name": "Dana",
        "email": "dana@example.com",
        "role": role,
        "manager_id": null,
        "created_at": "2024-05-01T10:00:00"
    })
}

fn feedback_json(tags: serde_json::Value) -> serde_json::Value {
    serde_json::json!({
        "id": 3,
        "employee_id": 7,
        "manager_id": 2,
        "strengths": "Clear writing",
        "areas_to_improve": "Estimate scope earlier",
        "sentiment": "positive",
        "created_at": "2024-05-02T09:00:00",
        "acknowledged": false,
        "tags": tags,
        "is_anonymous": false
    })
}

// =============================================================
// Role / User
// =============================================================

#[test]
fn role_serializes_lowercase() {
    assert_eq!(serde_json::to_string(&Role::Manager).unwrap(), "\"manager\"");
    assert_eq!(serde_json::to_string(&Role::Employee).unwrap(), "\"employee\"");
}

#[test]
fn role_rejects_unknown_value() {
    assert!(serde_json::from_str::<Role>("\"admin\"").is_err());
}

#[test]
fn user_role_predicates() {
    let manager: User = serde_json::from_value(user_json("manager")).unwrap();
    assert!(manager.is_manager());
    assert!(!manager.is_employee());

    let employee: User = serde_json::from_value(user_json("employee")).unwrap();
    assert!(employee.is_employee());
    assert!(!employee.is_manager());
}

#[test]
fn user_with_embedded_manager() {
    let mut json = user_json("employee");
    json["manager_id"] = serde_json::json!(2);
    json["manager"] = user_json("manager");
    let user: User = serde_json::from_value(json).unwrap();
    assert_eq!(user.manager_id, Some(2));
    assert_eq!(user.manager.as_ref().map(|m| m.role), Some(Role::Manager));
}

// =============================================================
// Feedback tags
// =============================================================

#[test]
fn feedback_tags_from_list() {
    let fb: Feedback = serde_json::from_value(feedback_json(serde_json::json!(["ownership", " clarity "]))).unwrap();
    assert_eq!(fb.tags, vec!["ownership".to_owned(), "clarity".to_owned()]);
}

#[test]
fn feedback_tags_from_comma_string() {
    let fb: Feedback = serde_json::from_value(feedback_json(serde_json::json!("ownership, clarity,,"))).unwrap();
    assert_eq!(fb.tags, vec!["ownership".to_owned(), "clarity".to_owned()]);
}

#[test]
fn feedback_tags_null_is_empty() {
    let fb: Feedback = serde_json::from_value(feedback_json(serde_json::Value::Null)).unwrap();
    assert!(fb.tags.is_empty());
}

#[test]
fn feedback_optional_fields_default() {
    let mut json = feedback_json(serde_json::json!([]));
    json.as_object_mut().unwrap().remove("tags");
    let fb: Feedback = serde_json::from_value(json).unwrap();
    assert!(fb.tags.is_empty());
    assert!(fb.employee_comment.is_none());
    assert!(fb.updated_at.is_none());
    assert_eq!(fb.sentiment, Sentiment::Positive);
}

// =============================================================
// Request bodies
// =============================================================

#[test]
fn feedback_update_skips_absent_fields() {
    let update = FeedbackUpdate { sentiment: Some(Sentiment::Neutral), ..FeedbackUpdate::default() };
    let json = serde_json::to_value(&update).unwrap();
    assert_eq!(json, serde_json::json!({"sentiment": "neutral"}));
    assert!(!update.is_empty());
    assert!(FeedbackUpdate::default().is_empty());
}

#[test]
fn register_data_omits_missing_manager() {
    let data = RegisterData {
        name: "Dana".to_owned(),
        email: "dana@example.com".to_owned(),
        password: "pw".to_owned(),
        role: Role::Manager,
        manager_id: None,
    };
    let json = serde_json::to_value(&data).unwrap();
    assert!(json.get("manager_id").is_none());
    assert_eq!(data.credentials().email, "dana@example.com");
    assert_eq!(data.credentials().password, "pw");
}

// =============================================================
// Dashboards
// =============================================================

#[test]
fn manager_dashboard_flattens_stats() {
    let json = serde_json::json!({
        "team_size": 1,
        "team_members": [user_json("employee")],
        "total_feedback": 4,
        "positive_feedback": 2,
        "neutral_feedback": 1,
        "negative_feedback": 1,
        "recent_feedback": [feedback_json(serde_json::json!([]))]
    });
    let dash: ManagerDashboard = serde_json::from_value(json).unwrap();
    assert_eq!(dash.team_size, 1);
    assert_eq!(dash.team_members.len(), 1);
    assert_eq!(dash.stats.total_feedback, 4);
    assert_eq!(dash.stats.recent_feedback.len(), 1);
}

#[test]
fn employee_dashboard_parses() {
    let json = serde_json::json!({
        "total_feedback": 2,
        "unacknowledged_feedback": 1,
        "positive_feedback": 2,
        "neutral_feedback": 0,
        "negative_feedback": 0,
        "recent_feedback": []
    });
    let dash: EmployeeDashboard = serde_json::from_value(json).unwrap();
    assert_eq!(dash.unacknowledged_feedback, 1);
    assert_eq!(dash.stats.positive_feedback, 2);
}

// =============================================================
// ApiErrorBody
// =============================================================

#[test]
fn error_body_string_detail() {
    let body: ApiErrorBody = serde_json::from_str(r#"{"detail":"Email already registered"}"#).unwrap();
    assert_eq!(body.message().as_deref(), Some("Email already registered"));
}

#[test]
fn error_body_validation_detail_uses_first_msg() {
    let body: ApiErrorBody =
        serde_json::from_str(r#"{"detail":[{"loc":["body","email"],"msg":"field required","type":"missing"}]}"#)
            .unwrap();
    assert_eq!(body.message().as_deref(), Some("field required"));
}

#[test]
fn error_body_blank_detail_is_none() {
    let body: ApiErrorBody = serde_json::from_str(r#"{"detail":"  "}"#).unwrap();
    assert_eq!(body.message(), None);
}

#[test]
fn error_body_validation_detail_skips_blank_msg() {
    let body: ApiErrorBody =
        serde_json::from_str(r#"{"detail":[{"msg":" "},{"msg":"value is not a valid email address"}]}"#).unwrap();
    assert_eq!(body.message().as_deref(), Some("value is not a valid email address"));

    let blank: ApiErrorBody = serde_json::from_str(r#"{"detail":[{"msg":""}]}"#).unwrap();
    assert_eq!(blank.message(), None);
}
