//! Verify build/parse methods against JSON test vectors stored in `test-vectors/`.
//!
//! Each vector file describes inputs, expected requests, simulated responses,
//! and expected parse results. Comparing parsed JSON (not raw strings) avoids
//! false negatives from field-ordering differences.

use expense_core::{
    ApiError, ExpenseClient, ExpenseCollection, ExpenseInput, ExpenseRecord, HttpMethod,
    HttpRequest, HttpResponse,
};
use secrecy::{ExposeSecret, SecretString};
use uuid::Uuid;

const BASE_URL: &str = "http://localhost:5000";

fn client() -> ExpenseClient {
    ExpenseClient::new(BASE_URL)
}

/// Parse the method string from test vectors into `HttpMethod`.
fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "PUT" => HttpMethod::Put,
        "DELETE" => HttpMethod::Delete,
        other => panic!("unknown method: {other}"),
    }
}

fn token(case: &serde_json::Value) -> SecretString {
    SecretString::from(case["token"].as_str().unwrap().to_string())
}

fn simulated_response(case: &serde_json::Value) -> HttpResponse {
    let sim = &case["simulated_response"];
    HttpResponse {
        status: sim["status"].as_u64().unwrap() as u16,
        headers: Vec::new(),
        body: sim["body"].as_str().unwrap().to_string(),
    }
}

/// Check method, path, headers and (when present) the JSON body.
fn assert_request(name: &str, req: &HttpRequest, expected: &serde_json::Value) {
    assert_eq!(req.method, parse_method(expected["method"].as_str().unwrap()), "{name}: method");
    assert_eq!(req.path, format!("{BASE_URL}{}", expected["path"].as_str().unwrap()), "{name}: path");

    let expected_headers: Vec<(String, String)> = expected["headers"]
        .as_array()
        .unwrap()
        .iter()
        .map(|h| {
            let arr = h.as_array().unwrap();
            (arr[0].as_str().unwrap().to_string(), arr[1].as_str().unwrap().to_string())
        })
        .collect();
    assert_eq!(req.headers, expected_headers, "{name}: headers");

    match expected.get("body") {
        Some(body) => {
            let req_body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
            assert_eq!(&req_body, body, "{name}: body");
        }
        None => assert!(req.body.is_none(), "{name}: body should be None"),
    }
}

fn assert_expected_error(name: &str, case: &serde_json::Value, err: ApiError) {
    let matched = match case["expected_error"].as_str().unwrap() {
        "MissingToken" => matches!(err, ApiError::MissingToken),
        "Unauthorized" => matches!(err, ApiError::Unauthorized { .. }),
        "NotFound" => matches!(err, ApiError::NotFound { .. }),
        "Http" => matches!(err, ApiError::Http { .. }),
        other => panic!("{name}: unknown expected_error: {other}"),
    };
    assert!(matched, "{name}: unexpected error {err:?}");
    if let Some(message) = case.get("expected_message") {
        assert_eq!(err.to_string(), message.as_str().unwrap(), "{name}: message");
    }
}

// ---------------------------------------------------------------------------
// Sign-in
// ---------------------------------------------------------------------------

#[test]
fn signin_test_vectors() {
    let raw = include_str!("../../test-vectors/signin.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    let c = client();
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let email = case["input"]["email"].as_str().unwrap();
        let password = case["input"]["password"].as_str().unwrap();

        let req = c.build_sign_in(email, password).unwrap();
        assert_request(name, &req, &case["expected_request"]);

        let result = c.parse_sign_in(simulated_response(case));
        if case.get("expected_error").is_some() {
            assert_expected_error(name, case, result.unwrap_err());
        } else {
            let token = result.unwrap();
            assert_eq!(token.expose_secret(), case["expected_token"].as_str().unwrap(), "{name}: token");
        }
    }
}

// ---------------------------------------------------------------------------
// Sign-up
// ---------------------------------------------------------------------------

#[test]
fn signup_test_vectors() {
    let raw = include_str!("../../test-vectors/signup.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    let c = client();
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let input = &case["input"];
        let username = input["username"].as_str().unwrap();
        let email = input["email"].as_str().unwrap();
        let password = input["password"].as_str().unwrap();

        let req = c.build_sign_up(username, email, password).unwrap();
        assert_request(name, &req, &case["expected_request"]);

        let result = c.parse_sign_up(simulated_response(case));
        if case.get("expected_error").is_some() {
            assert_expected_error(name, case, result.unwrap_err());
        } else {
            assert!(result.is_ok(), "{name}: expected success");
        }
    }
}

// ---------------------------------------------------------------------------
// List
// ---------------------------------------------------------------------------

#[test]
fn list_test_vectors() {
    let raw = include_str!("../../test-vectors/list.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    let c = client();
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();

        let req = c.build_list_expenses(&token(case));
        assert_request(name, &req, &case["expected_request"]);

        let collection = c.parse_list_expenses(simulated_response(case)).unwrap();
        let expected: ExpenseCollection = serde_json::from_value(case["expected_result"].clone()).unwrap();
        assert_eq!(collection, expected, "{name}: parsed result");
    }
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

#[test]
fn create_test_vectors() {
    let raw = include_str!("../../test-vectors/create.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    let c = client();
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let input: ExpenseInput = serde_json::from_value(case["input"].clone()).unwrap();

        let req = c.build_create_expense(&token(case), &input).unwrap();
        assert_request(name, &req, &case["expected_request"]);

        let record = c.parse_create_expense(simulated_response(case)).unwrap();
        let expected: ExpenseRecord = serde_json::from_value(case["expected_result"].clone()).unwrap();
        assert_eq!(record, expected, "{name}: parsed result");
    }
}

// ---------------------------------------------------------------------------
// Update
// ---------------------------------------------------------------------------

#[test]
fn update_test_vectors() {
    let raw = include_str!("../../test-vectors/update.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    let c = client();
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let id: Uuid = case["input_id"].as_str().unwrap().parse().unwrap();
        let input: ExpenseInput = serde_json::from_value(case["input"].clone()).unwrap();

        let req = c.build_update_expense(&token(case), id, &input).unwrap();
        assert_request(name, &req, &case["expected_request"]);

        let result = c.parse_update_expense(simulated_response(case));
        if case.get("expected_error").is_some() {
            assert_expected_error(name, case, result.unwrap_err());
        } else {
            let expected: ExpenseRecord =
                serde_json::from_value(case["expected_result"].clone()).unwrap();
            assert_eq!(result.unwrap(), expected, "{name}: parsed result");
        }
    }
}

// ---------------------------------------------------------------------------
// Delete
// ---------------------------------------------------------------------------

#[test]
fn delete_test_vectors() {
    let raw = include_str!("../../test-vectors/delete.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    let c = client();
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let id: Uuid = case["input_id"].as_str().unwrap().parse().unwrap();

        let req = c.build_delete_expense(&token(case), id);
        assert_request(name, &req, &case["expected_request"]);

        let result = c.parse_delete_expense(simulated_response(case));
        if case.get("expected_error").is_some() {
            assert_expected_error(name, case, result.unwrap_err());
        } else {
            assert!(result.is_ok(), "{name}: expected success");
        }
    }
}
