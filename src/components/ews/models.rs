/// Folder as returned by GetFolder
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Folder {
    pub id: String,
    pub change_key: Option<String>,
    pub display_name: Option<String>,
}

/// Inbox item as returned by FindItem
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MessageSummary {
    pub subject: Option<String>,
    pub received: Option<String>,
}

/// Well-known folders addressed by name instead of id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistinguishedFolder {
    MsgFolderRoot,
    Inbox,
}

impl DistinguishedFolder {
    pub fn id(&self) -> &'static str {
        match self {
            DistinguishedFolder::MsgFolderRoot => "msgfolderroot",
            DistinguishedFolder::Inbox => "inbox",
        }
    }
}
