mod common;

use common::*;
use mockito::{Matcher, Server};
use qq_ews_sync::components::ews::{Credentials, DistinguishedFolder, EwsError, Session};

#[tokio::test]
async fn test_connect_uses_delegate_access_and_basic_auth() {
    let mut server = Server::new_async().await;
    let config = test_config(&server);

    let root = server
        .mock("POST", EWS_PATH)
        .match_header("authorization", BASIC_AUTH)
        .match_header("content-type", Matcher::Regex("^text/xml".to_string()))
        .match_body(Matcher::AllOf(vec![
            root_body(),
            Matcher::Regex("<t:Mailbox><t:EmailAddress>someone@qq.com</t:EmailAddress></t:Mailbox>".to_string()),
        ]))
        .with_status(200)
        .with_body(get_folder_ok("root-id", "Top of Information Store"))
        .expect(1)
        .create_async()
        .await;
    let impersonation = server
        .mock("POST", EWS_PATH)
        .match_body(Matcher::Regex("ExchangeImpersonation".to_string()))
        .expect(0)
        .create_async()
        .await;

    let session = Session::connect(Credentials::new(EMAIL, PASSWORD), &config)
        .await
        .unwrap();

    assert_eq!(session.mailbox(), EMAIL);
    assert_eq!(session.server_version(), "Exchange2013");
    assert_eq!(session.root().id, "root-id");
    assert_eq!(
        session.root().display_name.as_deref(),
        Some("Top of Information Store")
    );
    root.assert_async().await;
    impersonation.assert_async().await;
}

#[tokio::test]
async fn test_get_folder_surfaces_response_code() {
    let mut server = Server::new_async().await;
    let config = test_config(&server);

    let _root = soap_mock(&mut server, root_body(), get_folder_ok("root-id", "Root")).await;
    let _inbox = soap_mock(
        &mut server,
        inbox_body(),
        get_folder_error("ErrorFolderNotFound", "The specified folder could not be found in the store."),
    )
    .await;

    let session = Session::connect(Credentials::new(EMAIL, PASSWORD), &config)
        .await
        .unwrap();
    let err = session
        .get_folder(DistinguishedFolder::Inbox)
        .await
        .unwrap_err();

    assert_eq!(err.code(), Some("ErrorFolderNotFound"));
}

#[tokio::test]
async fn test_unexpected_http_status_is_transport() {
    let mut server = Server::new_async().await;
    let config = test_config(&server);

    let _forbidden = server
        .mock("POST", EWS_PATH)
        .with_status(403)
        .with_body("Forbidden")
        .create_async()
        .await;

    let err = Session::connect(Credentials::new(EMAIL, PASSWORD), &config)
        .await
        .unwrap_err();

    match err {
        EwsError::Transport(message) => assert!(message.contains("403"), "{message}"),
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn test_credentials_debug_hides_password() {
    let credentials = Credentials::new(EMAIL, PASSWORD);
    let debug = format!("{credentials:?}");
    assert!(debug.contains(EMAIL));
    assert!(!debug.contains(PASSWORD));
}
