use weaver::http::status::HttpStatus;

#[test]
fn test_status_as_u16() {
    assert_eq!(HttpStatus::Ok.as_u16(), 200);
    assert_eq!(HttpStatus::BadRequest.as_u16(), 400);
    assert_eq!(HttpStatus::NotFound.as_u16(), 404);
    assert_eq!(HttpStatus::InternalServerError.as_u16(), 500);
}

#[test]
fn test_status_reason_phrase() {
    assert_eq!(HttpStatus::Ok.reason_phrase(), "OK");
    assert_eq!(HttpStatus::BadRequest.reason_phrase(), "Bad Request");
    assert_eq!(HttpStatus::NotFound.reason_phrase(), "Not Found");
    assert_eq!(
        HttpStatus::InternalServerError.reason_phrase(),
        "Internal Server Error"
    );
}

#[test]
fn test_status_display() {
    assert_eq!(HttpStatus::Ok.to_string(), "200 OK");
    assert_eq!(HttpStatus::NotFound.to_string(), "404 Not Found");
}
