//! Canned EWS responses and helpers shared by the integration tests.
#![allow(dead_code)]

use mockito::{Matcher, Mock, ServerGuard};
use qq_ews_sync::config::Config;
use qq_ews_sync::input::SyncRequest;
use std::time::Duration;

pub const EWS_PATH: &str = "/EWS/Exchange.asmx";
pub const EMAIL: &str = "someone@qq.com";
pub const PASSWORD: &str = "app-code";
/// base64("someone@qq.com:app-code")
pub const BASIC_AUTH: &str = "Basic c29tZW9uZUBxcS5jb206YXBwLWNvZGU=";

/// Config pointed at the mock server, with no retry budget
pub fn test_config(server: &ServerGuard) -> Config {
    let mut config = Config::new()
        .unwrap()
        .with_endpoint(&format!("{}{}", server.url(), EWS_PATH))
        .unwrap();
    config.max_wait = Duration::ZERO;
    config.initial_backoff = Duration::from_millis(10);
    config.request_timeout = Duration::from_secs(5);
    config
}

pub fn request() -> SyncRequest {
    SyncRequest {
        email: EMAIL.to_string(),
        password: PASSWORD.to_string(),
        start_date: "2024-03-01T00:00:00Z".to_string(),
        end_date: "2024-03-31T23:59:59Z".to_string(),
    }
}

pub fn root_body() -> Matcher {
    Matcher::Regex(r#"DistinguishedFolderId Id="msgfolderroot""#.to_string())
}

pub fn inbox_body() -> Matcher {
    Matcher::Regex(r#"DistinguishedFolderId Id="inbox""#.to_string())
}

pub fn find_item_body() -> Matcher {
    Matcher::Regex("<m:FindItem ".to_string())
}

/// Mock a 200 SOAP response for requests whose body matches `body`
pub async fn soap_mock(server: &mut ServerGuard, body: Matcher, response: String) -> Mock {
    server
        .mock("POST", EWS_PATH)
        .match_header("authorization", BASIC_AUTH)
        .match_body(body)
        .with_status(200)
        .with_header("content-type", "text/xml; charset=utf-8")
        .with_body(response)
        .create_async()
        .await
}

fn envelope(body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/">
  <s:Header>
    <h:ServerVersionInfo xmlns:h="http://schemas.microsoft.com/exchange/services/2006/types" MajorVersion="15" MinorVersion="0" MajorBuildNumber="1497" MinorBuildNumber="0" Version="V2_23"/>
  </s:Header>
  <s:Body>{body}</s:Body>
</s:Envelope>"#
    )
}

pub fn get_folder_ok(id: &str, display_name: &str) -> String {
    envelope(&format!(
        r#"<m:GetFolderResponse xmlns:m="http://schemas.microsoft.com/exchange/services/2006/messages" xmlns:t="http://schemas.microsoft.com/exchange/services/2006/types">
  <m:ResponseMessages>
    <m:GetFolderResponseMessage ResponseClass="Success">
      <m:ResponseCode>NoError</m:ResponseCode>
      <m:Folders>
        <t:Folder>
          <t:FolderId Id="{id}" ChangeKey="AQAAABYAAAA"/>
          <t:DisplayName>{display_name}</t:DisplayName>
          <t:TotalCount>12</t:TotalCount>
        </t:Folder>
      </m:Folders>
    </m:GetFolderResponseMessage>
  </m:ResponseMessages>
</m:GetFolderResponse>"#
    ))
}

pub fn get_folder_error(code: &str, text: &str) -> String {
    envelope(&format!(
        r#"<m:GetFolderResponse xmlns:m="http://schemas.microsoft.com/exchange/services/2006/messages">
  <m:ResponseMessages>
    <m:GetFolderResponseMessage ResponseClass="Error">
      <m:MessageText>{text}</m:MessageText>
      <m:ResponseCode>{code}</m:ResponseCode>
      <m:DescriptiveLinkKey>0</m:DescriptiveLinkKey>
    </m:GetFolderResponseMessage>
  </m:ResponseMessages>
</m:GetFolderResponse>"#
    ))
}

/// FindItem response listing messages in the given order
pub fn find_item_ok(subjects: &[Option<&str>]) -> String {
    let items: String = subjects
        .iter()
        .enumerate()
        .map(|(i, subject)| {
            let subject = match subject {
                Some(s) => format!("<t:Subject>{s}</t:Subject>"),
                None => String::new(),
            };
            format!(
                r#"<t:Message><t:ItemId Id="item-{i}" ChangeKey="CQAA"/>{subject}<t:DateTimeReceived>2024-03-{day:02}T08:00:00Z</t:DateTimeReceived></t:Message>"#,
                day = 28 - i
            )
        })
        .collect();

    envelope(&format!(
        r#"<m:FindItemResponse xmlns:m="http://schemas.microsoft.com/exchange/services/2006/messages" xmlns:t="http://schemas.microsoft.com/exchange/services/2006/types">
  <m:ResponseMessages>
    <m:FindItemResponseMessage ResponseClass="Success">
      <m:ResponseCode>NoError</m:ResponseCode>
      <m:RootFolder IndexedPagingOffset="{count}" TotalItemsInView="37" IncludesLastItemInRange="false">
        <t:Items>{items}</t:Items>
      </m:RootFolder>
    </m:FindItemResponseMessage>
  </m:ResponseMessages>
</m:FindItemResponse>"#,
        count = subjects.len()
    ))
}

pub fn soap_fault(code: &str, text: &str) -> String {
    envelope(&format!(
        r#"<s:Fault>
  <faultcode xmlns:a="http://schemas.microsoft.com/exchange/services/2006/types">a:{code}</faultcode>
  <faultstring xml:lang="en-US">{text}</faultstring>
  <detail>
    <e:ResponseCode xmlns:e="http://schemas.microsoft.com/exchange/services/2006/errors">{code}</e:ResponseCode>
    <e:Message xmlns:e="http://schemas.microsoft.com/exchange/services/2006/errors">{text}</e:Message>
  </detail>
</s:Fault>"#
    ))
}
