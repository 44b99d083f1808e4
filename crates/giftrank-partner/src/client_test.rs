use super::*;

fn credentials() -> PartnerCredentials {
    PartnerCredentials {
        access_key: "ak".to_string(),
        secret_key: "sk".to_string(),
    }
}

#[test]
fn search_query_encodes_keyword_and_appends_limit() {
    assert_eq!(
        PartnerClient::search_query("기계식 키보드", 5),
        "keyword=%EA%B8%B0%EA%B3%84%EC%8B%9D%20%ED%82%A4%EB%B3%B4%EB%93%9C&limit=5"
    );
}

#[test]
fn endpoint_joins_base_path_and_query() {
    let client =
        PartnerClient::with_base_url(credentials(), 5, "giftrank-test/0.1", "http://127.0.0.1:8080/")
            .unwrap();
    let url = client.endpoint(SEARCH_PATH, "keyword=a&limit=5").unwrap();
    assert_eq!(
        url.as_str(),
        "http://127.0.0.1:8080/v2/providers/affiliate_open_api/apis/openapi/products/search?keyword=a&limit=5"
    );
}

#[test]
fn endpoint_keeps_encoded_query_as_signed() {
    let client =
        PartnerClient::with_base_url(credentials(), 5, "giftrank-test/0.1", "http://127.0.0.1:8080")
            .unwrap();
    let query = PartnerClient::search_query("kid's (set)", 3);
    let url = client.endpoint(SEARCH_PATH, &query).unwrap();
    assert_eq!(url.query(), Some(query.as_str()));
}

#[test]
fn endpoint_without_query_has_no_question_mark() {
    let client =
        PartnerClient::with_base_url(credentials(), 5, "giftrank-test/0.1", "http://127.0.0.1:8080")
            .unwrap();
    let url = client.endpoint(DEEPLINK_PATH, "").unwrap();
    assert_eq!(url.query(), None);
    assert_eq!(url.path(), DEEPLINK_PATH);
}

#[test]
fn with_base_url_rejects_garbage() {
    let result = PartnerClient::with_base_url(credentials(), 5, "giftrank-test/0.1", "not a url");
    assert!(
        matches!(result, Err(PartnerError::InvalidBaseUrl { .. })),
        "expected InvalidBaseUrl"
    );
}
