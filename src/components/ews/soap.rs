//! SOAP request bodies and response parsing for the handful of EWS
//! operations the sync runner needs.

use super::error::EwsError;
use super::models::{DistinguishedFolder, Folder, MessageSummary};
use roxmltree::{Document, Node};
use std::time::Duration;
use tracing::warn;

pub const SOAP_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";
pub const TYPES_NS: &str = "http://schemas.microsoft.com/exchange/services/2006/types";
pub const MESSAGES_NS: &str = "http://schemas.microsoft.com/exchange/services/2006/messages";

/// Response code used by Exchange for throttling
pub const SERVER_BUSY: &str = "ErrorServerBusy";

/// Escape text for use in element content and attribute values
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Wrap an operation body in a SOAP envelope pinned to `server_version`
pub fn envelope(server_version: &str, body: &str) -> String {
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="utf-8"?>"#,
            r#"<soap:Envelope xmlns:soap="{soap}" xmlns:t="{types}" xmlns:m="{messages}">"#,
            r#"<soap:Header><t:RequestServerVersion Version="{version}"/></soap:Header>"#,
            r#"<soap:Body>{body}</soap:Body>"#,
            r#"</soap:Envelope>"#
        ),
        soap = SOAP_NS,
        types = TYPES_NS,
        messages = MESSAGES_NS,
        version = escape(server_version),
        body = body,
    )
}

/// GetFolder for a distinguished folder in `mailbox` (delegate access)
pub fn get_folder(folder: DistinguishedFolder, mailbox: &str) -> String {
    format!(
        concat!(
            r#"<m:GetFolder>"#,
            r#"<m:FolderShape><t:BaseShape>Default</t:BaseShape></m:FolderShape>"#,
            r#"<m:FolderIds><t:DistinguishedFolderId Id="{id}">"#,
            r#"<t:Mailbox><t:EmailAddress>{mailbox}</t:EmailAddress></t:Mailbox>"#,
            r#"</t:DistinguishedFolderId></m:FolderIds>"#,
            r#"</m:GetFolder>"#
        ),
        id = folder.id(),
        mailbox = escape(mailbox),
    )
}

/// FindItem for the newest `limit` items of `folder`, by receipt time
pub fn find_items(folder: &Folder, limit: usize) -> String {
    let change_key = folder
        .change_key
        .as_deref()
        .map(|key| format!(r#" ChangeKey="{}""#, escape(key)))
        .unwrap_or_default();

    format!(
        concat!(
            r#"<m:FindItem Traversal="Shallow">"#,
            r#"<m:ItemShape><t:BaseShape>IdOnly</t:BaseShape><t:AdditionalProperties>"#,
            r#"<t:FieldURI FieldURI="item:Subject"/>"#,
            r#"<t:FieldURI FieldURI="item:DateTimeReceived"/>"#,
            r#"</t:AdditionalProperties></m:ItemShape>"#,
            r#"<m:IndexedPageItemView MaxEntriesReturned="{limit}" Offset="0" BasePoint="Beginning"/>"#,
            r#"<m:SortOrder><t:FieldOrder Order="Descending">"#,
            r#"<t:FieldURI FieldURI="item:DateTimeReceived"/>"#,
            r#"</t:FieldOrder></m:SortOrder>"#,
            r#"<m:ParentFolderIds><t:FolderId Id="{id}"{change_key}/></m:ParentFolderIds>"#,
            r#"</m:FindItem>"#
        ),
        limit = limit,
        id = escape(&folder.id),
        change_key = change_key,
    )
}

/// SOAP fault returned instead of a response body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fault {
    pub code: Option<String>,
    pub message: String,
    pub back_off: Option<Duration>,
}

impl Fault {
    pub fn into_error(self) -> EwsError {
        EwsError::Response {
            code: self.code.unwrap_or_else(|| "SoapFault".to_string()),
            message: self.message,
        }
    }
}

/// Throttling signal found in a response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerBusy {
    pub back_off: Option<Duration>,
}

/// Extract a SOAP fault, if the document is one
pub fn parse_fault(text: &str) -> Option<Fault> {
    let doc = Document::parse(text).ok()?;
    let fault = doc
        .descendants()
        .find(|n| n.is_element() && n.tag_name().name() == "Fault" && n.tag_name().namespace() == Some(SOAP_NS))?;

    let message = child(fault, "faultstring")
        .and_then(|n| n.text())
        .unwrap_or_default()
        .trim()
        .to_string();
    let code = descendant(fault, "ResponseCode")
        .and_then(|n| n.text())
        .map(|s| s.trim().to_string());

    Some(Fault {
        code,
        message,
        back_off: back_off(fault),
    })
}

/// Detect ErrorServerBusy anywhere in the response
pub fn server_busy(text: &str) -> Option<ServerBusy> {
    let doc = Document::parse(text).ok()?;
    let busy = doc
        .descendants()
        .any(|n| is(n, "ResponseCode") && n.text().map(str::trim) == Some(SERVER_BUSY));

    busy.then(|| ServerBusy {
        back_off: back_off(doc.root()),
    })
}

/// Parse a GetFolder response into its single folder
pub fn parse_get_folder(text: &str) -> Result<Folder, EwsError> {
    let doc = parse(text)?;
    let message = response_message(&doc, "GetFolderResponseMessage")?;

    let folder = child(message, "Folders")
        .and_then(|folders| folders.children().find(|n| n.is_element()))
        .ok_or_else(|| EwsError::Malformed("GetFolder response has no folder".to_string()))?;

    let folder_id = child(folder, "FolderId")
        .ok_or_else(|| EwsError::Malformed("folder has no FolderId".to_string()))?;
    let id = folder_id
        .attribute("Id")
        .ok_or_else(|| EwsError::Malformed("FolderId has no Id".to_string()))?;

    Ok(Folder {
        id: id.to_string(),
        change_key: folder_id.attribute("ChangeKey").map(str::to_string),
        display_name: child(folder, "DisplayName")
            .and_then(|n| n.text())
            .map(str::to_string),
    })
}

/// Parse a FindItem response; items keep the server's order
pub fn parse_find_item(text: &str) -> Result<Vec<MessageSummary>, EwsError> {
    let doc = parse(text)?;
    let message = response_message(&doc, "FindItemResponseMessage")?;

    let items = child(message, "RootFolder")
        .and_then(|root| child(root, "Items"))
        .ok_or_else(|| EwsError::Malformed("FindItem response has no Items".to_string()))?;

    Ok(items
        .children()
        .filter(|n| n.is_element())
        .map(|item| MessageSummary {
            subject: child(item, "Subject")
                .and_then(|n| n.text())
                .map(str::to_string),
            received: child(item, "DateTimeReceived")
                .and_then(|n| n.text())
                .map(str::to_string),
        })
        .collect())
}

fn parse(text: &str) -> Result<Document<'_>, EwsError> {
    Document::parse(text).map_err(|e| EwsError::Malformed(e.to_string()))
}

/// Locate a response message and turn an error ResponseClass into an error
fn response_message<'a, 'input>(
    doc: &'a Document<'input>,
    name: &str,
) -> Result<Node<'a, 'input>, EwsError> {
    let message = doc
        .descendants()
        .find(|n| is(*n, name))
        .ok_or_else(|| EwsError::Malformed(format!("missing {name}")))?;

    let code = child(message, "ResponseCode")
        .and_then(|n| n.text())
        .map(str::trim)
        .unwrap_or("NoError");
    let text = child(message, "MessageText")
        .and_then(|n| n.text())
        .map(str::trim)
        .unwrap_or_default();

    match message.attribute("ResponseClass") {
        Some("Error") => Err(EwsError::Response {
            code: code.to_string(),
            message: text.to_string(),
        }),
        Some("Warning") => {
            warn!("{name} returned a warning: {code} {text}");
            Ok(message)
        }
        _ => Ok(message),
    }
}

fn is(node: Node, name: &str) -> bool {
    node.is_element() && node.tag_name().name() == name
}

fn child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|n| is(*n, name))
}

fn descendant<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.descendants().find(|n| is(*n, name))
}

/// BackOffMilliseconds from a MessageXml block
fn back_off(node: Node) -> Option<Duration> {
    node.descendants()
        .find(|n| is(*n, "Value") && n.attribute("Name") == Some("BackOffMilliseconds"))
        .and_then(|n| n.text())
        .and_then(|ms| ms.trim().parse::<u64>().ok())
        .map(Duration::from_millis)
}
