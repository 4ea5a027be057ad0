//! CLI Argument Parsing
//!
//! CLIの引数解析

use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};

use crate::adapter::config::EntityKind;
use crate::domain::entities::token_content::{TokenContentFilter, TokenContentKind};
use crate::domain::entities::{FileFilter, OwnedFileFilter};

/// Blobストレージ上のドキュメントを操作するCLI
#[derive(Parser, Debug, Clone)]
#[command(name = "blobdoc")]
#[command(about = "Query and manage documents stored as Cloud Storage objects", long_about = None)]
pub struct Args {
    /// Config file path
    #[arg(short, long, default_value = "./.blobdoc/config.json")]
    pub config: String,

    #[command(subcommand)]
    pub command: Command,
}

/// Entity kind
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityArg {
    MessageImage,
    InquiryImage,
    CampaignImage,
    Attachment,
    AvatarIcon,
    TokenContent,
    ListImage,
}

impl From<EntityArg> for EntityKind {
    fn from(arg: EntityArg) -> Self {
        match arg {
            EntityArg::MessageImage => EntityKind::MessageImage,
            EntityArg::InquiryImage => EntityKind::InquiryImage,
            EntityArg::CampaignImage => EntityKind::CampaignImage,
            EntityArg::Attachment => EntityKind::Attachment,
            EntityArg::AvatarIcon => EntityKind::AvatarIcon,
            EntityArg::TokenContent => EntityKind::TokenContent,
            EntityArg::ListImage => EntityKind::ListImage,
        }
    }
}

fn parse_token_kind(value: &str) -> Result<TokenContentKind, String> {
    value.parse()
}

/// List filters shared by `list`, `list-cursor` and `count`
#[derive(ClapArgs, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Parent entity id (narrows the scan to `{parent}/`)
    #[arg(long)]
    pub parent: Option<String>,

    /// Case-insensitive substring of the file name
    #[arg(long)]
    pub file_name: Option<String>,

    /// Accepted MIME types (repeatable)
    #[arg(long = "mime-type")]
    pub mime_types: Vec<String>,

    #[arg(long)]
    pub min_size: Option<u64>,

    #[arg(long)]
    pub max_size: Option<u64>,

    /// true: only soft-deleted, false: only active
    #[arg(long)]
    pub deleted: Option<bool>,

    /// Token content kinds (repeatable, token-content only)
    #[arg(long = "kind", value_parser = parse_token_kind)]
    pub kinds: Vec<TokenContentKind>,
}

impl FilterArgs {
    pub fn file_filter(&self) -> FileFilter {
        FileFilter {
            file_name: self.file_name.clone(),
            mime_types: (!self.mime_types.is_empty()).then(|| self.mime_types.clone()),
            min_size: self.min_size,
            max_size: self.max_size,
            deleted: self.deleted,
            ..Default::default()
        }
    }
}

/// Builds an entity filter from CLI flags
pub trait FromFilterArgs {
    fn from_filter_args(args: &FilterArgs) -> Self;
}

impl FromFilterArgs for OwnedFileFilter {
    fn from_filter_args(args: &FilterArgs) -> Self {
        Self {
            parent_id: args.parent.clone(),
            file: args.file_filter(),
        }
    }
}

impl FromFilterArgs for TokenContentFilter {
    fn from_filter_args(args: &FilterArgs) -> Self {
        Self {
            token_id: args.parent.clone(),
            kinds: (!args.kinds.is_empty()).then(|| args.kinds.clone()),
            file: args.file_filter(),
            ..Default::default()
        }
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Issue a signed upload URL
    IssueUrl {
        #[arg(long, value_enum)]
        entity: EntityArg,
        #[arg(long)]
        parent: String,
        #[arg(long)]
        file_name: Option<String>,
        #[arg(long)]
        mime_type: Option<String>,
        #[arg(long)]
        size: Option<u64>,
        /// Child id for nested entities (random when omitted)
        #[arg(long)]
        child_id: Option<String>,
    },

    /// Attach metadata to an uploaded object
    Register {
        #[arg(long, value_enum)]
        entity: EntityArg,
        #[arg(long)]
        parent: String,
        #[arg(long)]
        object_path: String,
        #[arg(long)]
        bucket: Option<String>,
        #[arg(long)]
        file_name: Option<String>,
        #[arg(long)]
        size: Option<u64>,
        #[arg(long)]
        child_id: Option<String>,
        #[arg(long, default_value = "cli")]
        actor: String,
    },

    /// Get one entity by object path
    Get {
        #[arg(long, value_enum)]
        entity: EntityArg,
        #[arg(long)]
        id: String,
    },

    /// Page-based listing
    List {
        #[arg(long, value_enum)]
        entity: EntityArg,
        #[command(flatten)]
        filter: FilterArgs,
        /// Sort column (unknown columns use the default order)
        #[arg(long)]
        sort: Option<String>,
        #[arg(long)]
        desc: bool,
        #[arg(long, default_value_t = 1)]
        page: usize,
        #[arg(long, default_value_t = 20)]
        per_page: usize,
    },

    /// Cursor-based listing
    ListCursor {
        #[arg(long, value_enum)]
        entity: EntityArg,
        #[command(flatten)]
        filter: FilterArgs,
        #[arg(long)]
        cursor: Option<String>,
        #[arg(long, default_value_t = 20)]
        limit: usize,
        #[arg(long)]
        desc: bool,
    },

    /// Count matching entities
    Count {
        #[arg(long, value_enum)]
        entity: EntityArg,
        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Delete one object
    Delete {
        #[arg(long, value_enum)]
        entity: EntityArg,
        #[arg(long)]
        id: String,
    },

    /// Delete every file of a parent
    DeleteParent {
        #[arg(long, value_enum)]
        entity: EntityArg,
        #[arg(long)]
        parent: String,
        /// Mark as deleted instead of removing objects
        #[arg(long)]
        soft: bool,
        #[arg(long, default_value = "cli")]
        actor: String,
    },
}

impl Command {
    pub fn entity(&self) -> EntityKind {
        let arg = match self {
            Self::IssueUrl { entity, .. }
            | Self::Register { entity, .. }
            | Self::Get { entity, .. }
            | Self::List { entity, .. }
            | Self::ListCursor { entity, .. }
            | Self::Count { entity, .. }
            | Self::Delete { entity, .. }
            | Self::DeleteParent { entity, .. } => *entity,
        };
        arg.into()
    }

    /// URL署名者が必要なコマンドか
    pub fn needs_signer(&self) -> bool {
        matches!(self, Self::IssueUrl { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_default_config() {
        let args = Args::parse_from([
            "blobdoc",
            "get",
            "--entity",
            "message-image",
            "--id",
            "m1/a.png",
        ]);
        assert_eq!(args.config, "./.blobdoc/config.json");
        assert_eq!(args.command.entity(), EntityKind::MessageImage);
        assert!(!args.command.needs_signer());
    }

    #[test]
    fn test_args_custom_config() {
        let args = Args::parse_from([
            "blobdoc",
            "-c",
            "/custom/config.json",
            "count",
            "--entity",
            "attachment",
        ]);
        assert_eq!(args.config, "/custom/config.json");
    }

    #[test]
    fn test_issue_url_args() {
        let args = Args::parse_from([
            "blobdoc",
            "issue-url",
            "--entity",
            "avatar-icon",
            "--parent",
            "av1",
            "--mime-type",
            "image/png",
        ]);
        assert!(args.command.needs_signer());
        match args.command {
            Command::IssueUrl {
                parent, mime_type, ..
            } => {
                assert_eq!(parent, "av1");
                assert_eq!(mime_type.as_deref(), Some("image/png"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_list_filter_args() {
        let args = Args::parse_from([
            "blobdoc",
            "list",
            "--entity",
            "token-content",
            "--parent",
            "t1",
            "--kind",
            "icon",
            "--mime-type",
            "image/png",
            "--mime-type",
            "image/svg+xml",
            "--deleted",
            "false",
            "--sort",
            "display_order",
            "--desc",
        ]);

        match args.command {
            Command::List {
                filter, sort, desc, page, per_page, ..
            } => {
                let token = TokenContentFilter::from_filter_args(&filter);
                assert_eq!(token.token_id.as_deref(), Some("t1"));
                assert_eq!(token.kinds, Some(vec![TokenContentKind::Icon]));
                assert_eq!(token.file.mime_types.as_ref().map(Vec::len), Some(2));
                assert_eq!(token.file.deleted, Some(false));
                assert_eq!(sort.as_deref(), Some("display_order"));
                assert!(desc);
                assert_eq!((page, per_page), (1, 20));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_unset_filters_pass() {
        let owned = OwnedFileFilter::from_filter_args(&FilterArgs::default());
        assert_eq!(owned, OwnedFileFilter::default());
    }

    #[test]
    fn test_invalid_kind_is_rejected() {
        let result = Args::try_parse_from([
            "blobdoc",
            "count",
            "--entity",
            "token-content",
            "--kind",
            "banner",
        ]);
        assert!(result.is_err());
    }
}
