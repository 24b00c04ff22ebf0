//! Typed interaction intents and their wire encoding.
//!
//! Every interactive UI element carries a single underscore-delimited custom
//! id. This module is the only place those ids are built or taken apart:
//! each action family has one variant, `encode` produces the id attached to
//! the component, and `parse` recovers the variant from an incoming
//! interaction. Unknown or malformed ids parse to `None` and the router
//! treats them as inert.
//!
//! Discord snowflakes never contain the delimiter, but database row ids do
//! (`rg_...`, `tc_...`, `tp_...`), so multi-field ids are parsed
//! positionally from both ends rather than by naive splitting.

use serenity::model::id::{ChannelId, RoleId, UserId};

use super::guard::{AccessPolicy, Capability};

/// Target Discord category for tickets of a given type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryTarget {
    /// Fall back to the auto-created "Tickets" category
    Default,
    /// A specific category channel
    Channel(ChannelId),
}

impl CategoryTarget {
    fn encode(&self) -> String {
        match self {
            CategoryTarget::Default => "default".to_string(),
            CategoryTarget::Channel(id) => id.get().to_string(),
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        if s == "default" {
            return Some(CategoryTarget::Default);
        }
        s.parse::<u64>().ok().map(|n| Self::Channel(ChannelId::new(n)))
    }

    pub fn channel_id(&self) -> Option<ChannelId> {
        match self {
            CategoryTarget::Default => None,
            CategoryTarget::Channel(id) => Some(*id),
        }
    }
}

/// Intent carried by a button press or select-menu choice
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComponentIntent {
    // Role menu (wizard owner bound)
    RoleRequestMenu { owner: UserId },
    RoleRemoveMenu { owner: UserId },
    RoleListMenu { owner: UserId },
    RoleGroupRequest { owner: UserId, group_id: String },
    RoleSelect { owner: UserId },
    RoleRemoveSelect { owner: UserId },

    // Approval buttons on public messages (staff only, not owner bound)
    ApproveRole { requester: UserId, role_id: RoleId },
    DenyRole { requester: UserId, role_id: RoleId },
    ApproveRemoval { requester: UserId, role_id: RoleId },
    DenyRemoval { requester: UserId, role_id: RoleId },
    ApproveGroup { requester: UserId, group_id: String },
    DenyGroup { requester: UserId, group_id: String },

    // Pending queue management
    PendingRequests { owner: UserId },
    PendingRefresh { owner: UserId },
    PendingClear { owner: UserId },
    PendingDelete { owner: UserId },
    PendingDeleteSelect { owner: UserId },

    // Role group administration
    GroupCreate { owner: UserId },
    GroupCreateSelect { owner: UserId },
    GroupManage { owner: UserId },
    GroupDeleteSelect { owner: UserId },
    GroupEditName { owner: UserId, group_id: String },
    GroupEditDesc { owner: UserId, group_id: String },
    GroupEditRequired { owner: UserId, group_id: String },
    GroupRequiredSelect { owner: UserId, group_id: String },

    // Ticket administration menu
    TicketCreatePanel { owner: UserId },
    TicketPanelChannelSelect { owner: UserId },
    TicketManageCategories { owner: UserId },
    TicketCustomize { owner: UserId },
    TicketStats { owner: UserId },
    TicketDeletePanel { owner: UserId },
    TicketListPanels { owner: UserId },
    TicketBack { owner: UserId },

    // Category authoring wizard
    CategoryCreate { owner: UserId },
    CategoryTargetSelect { owner: UserId },
    CategoryStyleSelect { owner: UserId, target: CategoryTarget },
    CategoryEditSelect { owner: UserId },
    CategoryEditStyleSelect { owner: UserId, category_id: String },
    CategoryEditTargetSelect { owner: UserId, category_id: String, style: u8 },
    CategoryDeleteSelect { owner: UserId },
    CategoryDeleteConfirm { owner: UserId, category_id: String },

    // Panel maintenance
    PanelCustomizeSelect { owner: UserId },
    PanelDeleteSelect { owner: UserId },
    PanelDeleteConfirm { owner: UserId, panel_id: String },

    // Ticket lifecycle (public buttons, no owner binding)
    CreateTicket { category_key: String },
    CloseTicket { ticket_id: String },
    ConfirmClose { ticket_id: String },
    CancelClose,
    RenameTicket { ticket_id: String },
}

/// Intent carried by a modal submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalIntent {
    RoleSearch { owner: UserId },
    GroupNameInput { owner: UserId, group_id: String },
    GroupDescInput { owner: UserId, group_id: String },
    PanelSetup { owner: UserId, channel_id: ChannelId },
    PanelCustomize { owner: UserId, panel_id: String },
    CategoryCreate { owner: UserId, target: CategoryTarget, style: u8 },
    CategoryEdit { owner: UserId, category_id: String, style: u8, target: CategoryTarget },
    TicketRename { ticket_id: String },
}

fn parse_user(s: &str) -> Option<UserId> {
    s.parse::<u64>().ok().map(UserId::new)
}

fn parse_role(s: &str) -> Option<RoleId> {
    s.parse::<u64>().ok().map(RoleId::new)
}

/// `{owner}_{tail}` where the tail may itself contain delimiters
fn owner_and_tail(rest: &str) -> Option<(UserId, String)> {
    let (owner, tail) = rest.split_once('_')?;
    if tail.is_empty() {
        return None;
    }
    Some((parse_user(owner)?, tail.to_string()))
}

/// `{owner}_{roleId}`
fn owner_and_role(rest: &str) -> Option<(UserId, RoleId)> {
    let (owner, role) = rest.split_once('_')?;
    Some((parse_user(owner)?, parse_role(role)?))
}

/// `{owner}_{middle}_{last}` where only the middle may contain delimiters
fn owner_middle_last(rest: &str) -> Option<(UserId, String, String)> {
    let (owner, tail) = rest.split_once('_')?;
    let (middle, last) = tail.rsplit_once('_')?;
    if middle.is_empty() || last.is_empty() {
        return None;
    }
    Some((parse_user(owner)?, middle.to_string(), last.to_string()))
}

fn parse_style(s: &str) -> Option<u8> {
    match s.parse::<u8>().ok()? {
        n @ 1..=4 => Some(n),
        _ => None,
    }
}

/// Category row ids (`tc_<uuid>`) travel through the four-field edit-modal
/// token as the bare 32-hex uuid; the full id plus two snowflakes would
/// overflow Discord's 100-character custom id limit. Ids that are not a
/// `tc_`-prefixed uuid pass through unchanged.
fn compact_category_id(id: &str) -> String {
    let Some(uuid) = id.strip_prefix("tc_") else {
        return id.to_string();
    };
    let hex: String = uuid.chars().filter(|c| *c != '-').collect();
    if hex.len() == 32 && hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        hex
    } else {
        id.to_string()
    }
}

fn expand_category_id(field: &str) -> String {
    if field.len() == 32 && field.bytes().all(|b| b.is_ascii_hexdigit()) {
        format!(
            "tc_{}-{}-{}-{}-{}",
            &field[..8],
            &field[8..12],
            &field[12..16],
            &field[16..20],
            &field[20..]
        )
    } else {
        field.to_string()
    }
}

impl ComponentIntent {
    /// Build the custom id attached to a component
    pub fn encode(&self) -> String {
        use ComponentIntent::*;
        match self {
            RoleRequestMenu { owner } => format!("role_request_{owner}"),
            RoleRemoveMenu { owner } => format!("role_remove_{owner}"),
            RoleListMenu { owner } => format!("role_list_{owner}"),
            RoleGroupRequest { owner, group_id } => format!("rolegroup_request_{owner}_{group_id}"),
            RoleSelect { owner } => format!("role_select_{owner}"),
            RoleRemoveSelect { owner } => format!("role_remove_select_{owner}"),
            ApproveRole { requester, role_id } => format!("approve_role_{requester}_{role_id}"),
            DenyRole { requester, role_id } => format!("deny_role_{requester}_{role_id}"),
            ApproveRemoval { requester, role_id } => {
                format!("approve_removal_{requester}_{role_id}")
            }
            DenyRemoval { requester, role_id } => format!("deny_removal_{requester}_{role_id}"),
            ApproveGroup { requester, group_id } => format!("approve_group_{requester}_{group_id}"),
            DenyGroup { requester, group_id } => format!("deny_group_{requester}_{group_id}"),
            PendingRequests { owner } => format!("pending_requests_{owner}"),
            PendingRefresh { owner } => format!("pending_refresh_{owner}"),
            PendingClear { owner } => format!("pending_clear_{owner}"),
            PendingDelete { owner } => format!("pending_delete_{owner}"),
            PendingDeleteSelect { owner } => format!("pending_delete_select_{owner}"),
            GroupCreate { owner } => format!("rolegroup_create_{owner}"),
            GroupCreateSelect { owner } => format!("rolegroup_create_select_{owner}"),
            GroupManage { owner } => format!("rolegroup_manage_{owner}"),
            GroupDeleteSelect { owner } => format!("rolegroup_delete_select_{owner}"),
            GroupEditName { owner, group_id } => format!("rolegroup_editname_{owner}_{group_id}"),
            GroupEditDesc { owner, group_id } => format!("rolegroup_editdesc_{owner}_{group_id}"),
            GroupEditRequired { owner, group_id } => {
                format!("rolegroup_editrequired_{owner}_{group_id}")
            }
            GroupRequiredSelect { owner, group_id } => {
                format!("rolegroup_required_select_{owner}_{group_id}")
            }
            TicketCreatePanel { owner } => format!("ticket_create_panel_{owner}"),
            TicketPanelChannelSelect { owner } => format!("ticket_panel_channel_{owner}"),
            TicketManageCategories { owner } => format!("ticket_manage_categories_{owner}"),
            TicketCustomize { owner } => format!("ticket_customize_{owner}"),
            TicketStats { owner } => format!("ticket_stats_{owner}"),
            TicketDeletePanel { owner } => format!("ticket_delete_panel_{owner}"),
            TicketListPanels { owner } => format!("ticket_list_panels_{owner}"),
            TicketBack { owner } => format!("ticket_back_{owner}"),
            CategoryCreate { owner } => format!("category_create_{owner}"),
            CategoryTargetSelect { owner } => format!("category_select_discord_{owner}"),
            CategoryStyleSelect { owner, target } => {
                format!("category_style_select_{owner}_{}", target.encode())
            }
            CategoryEditSelect { owner } => format!("category_edit_select_{owner}"),
            CategoryEditStyleSelect { owner, category_id } => {
                format!("category_edit_style_select_{owner}_{category_id}")
            }
            CategoryEditTargetSelect { owner, category_id, style } => {
                format!("category_edit_discord_select_{owner}_{category_id}_{style}")
            }
            CategoryDeleteSelect { owner } => format!("category_delete_select_{owner}"),
            CategoryDeleteConfirm { owner, category_id } => {
                format!("category_delete_confirm_{owner}_{category_id}")
            }
            PanelCustomizeSelect { owner } => format!("panel_customize_select_{owner}"),
            PanelDeleteSelect { owner } => format!("panel_delete_select_{owner}"),
            PanelDeleteConfirm { owner, panel_id } => {
                format!("panel_delete_confirm_{owner}_{panel_id}")
            }
            CreateTicket { category_key } => format!("create_ticket_{category_key}"),
            CloseTicket { ticket_id } => format!("close_ticket_{ticket_id}"),
            ConfirmClose { ticket_id } => format!("confirm_close_{ticket_id}"),
            CancelClose => "cancel_close".to_string(),
            RenameTicket { ticket_id } => format!("rename_ticket_{ticket_id}"),
        }
    }

    /// Parse an incoming custom id. Unknown or malformed ids yield `None`.
    pub fn parse(custom_id: &str) -> Option<Self> {
        use ComponentIntent::*;

        if custom_id == "cancel_close" {
            return Some(CancelClose);
        }

        // Families where one id is a textual prefix of another are tried
        // most-specific first.
        if let Some(rest) = custom_id.strip_prefix("role_remove_select_") {
            return Some(RoleRemoveSelect { owner: parse_user(rest)? });
        }
        if let Some(rest) = custom_id.strip_prefix("role_remove_") {
            return Some(RoleRemoveMenu { owner: parse_user(rest)? });
        }
        if let Some(rest) = custom_id.strip_prefix("role_request_") {
            return Some(RoleRequestMenu { owner: parse_user(rest)? });
        }
        if let Some(rest) = custom_id.strip_prefix("role_list_") {
            return Some(RoleListMenu { owner: parse_user(rest)? });
        }
        if let Some(rest) = custom_id.strip_prefix("role_select_") {
            return Some(RoleSelect { owner: parse_user(rest)? });
        }
        if let Some(rest) = custom_id.strip_prefix("rolegroup_request_") {
            let (owner, group_id) = owner_and_tail(rest)?;
            return Some(RoleGroupRequest { owner, group_id });
        }
        if let Some(rest) = custom_id.strip_prefix("approve_role_") {
            let (requester, role_id) = owner_and_role(rest)?;
            return Some(ApproveRole { requester, role_id });
        }
        if let Some(rest) = custom_id.strip_prefix("deny_role_") {
            let (requester, role_id) = owner_and_role(rest)?;
            return Some(DenyRole { requester, role_id });
        }
        if let Some(rest) = custom_id.strip_prefix("approve_removal_") {
            let (requester, role_id) = owner_and_role(rest)?;
            return Some(ApproveRemoval { requester, role_id });
        }
        if let Some(rest) = custom_id.strip_prefix("deny_removal_") {
            let (requester, role_id) = owner_and_role(rest)?;
            return Some(DenyRemoval { requester, role_id });
        }
        if let Some(rest) = custom_id.strip_prefix("approve_group_") {
            let (requester, group_id) = owner_and_tail(rest)?;
            return Some(ApproveGroup { requester, group_id });
        }
        if let Some(rest) = custom_id.strip_prefix("deny_group_") {
            let (requester, group_id) = owner_and_tail(rest)?;
            return Some(DenyGroup { requester, group_id });
        }
        if let Some(rest) = custom_id.strip_prefix("pending_requests_") {
            return Some(PendingRequests { owner: parse_user(rest)? });
        }
        if let Some(rest) = custom_id.strip_prefix("pending_refresh_") {
            return Some(PendingRefresh { owner: parse_user(rest)? });
        }
        if let Some(rest) = custom_id.strip_prefix("pending_clear_") {
            return Some(PendingClear { owner: parse_user(rest)? });
        }
        if let Some(rest) = custom_id.strip_prefix("pending_delete_select_") {
            return Some(PendingDeleteSelect { owner: parse_user(rest)? });
        }
        if let Some(rest) = custom_id.strip_prefix("pending_delete_") {
            return Some(PendingDelete { owner: parse_user(rest)? });
        }
        if let Some(rest) = custom_id.strip_prefix("rolegroup_create_select_") {
            return Some(GroupCreateSelect { owner: parse_user(rest)? });
        }
        if let Some(rest) = custom_id.strip_prefix("rolegroup_create_") {
            return Some(GroupCreate { owner: parse_user(rest)? });
        }
        if let Some(rest) = custom_id.strip_prefix("rolegroup_manage_") {
            return Some(GroupManage { owner: parse_user(rest)? });
        }
        if let Some(rest) = custom_id.strip_prefix("rolegroup_delete_select_") {
            return Some(GroupDeleteSelect { owner: parse_user(rest)? });
        }
        if let Some(rest) = custom_id.strip_prefix("rolegroup_editname_") {
            let (owner, group_id) = owner_and_tail(rest)?;
            return Some(GroupEditName { owner, group_id });
        }
        if let Some(rest) = custom_id.strip_prefix("rolegroup_editdesc_") {
            let (owner, group_id) = owner_and_tail(rest)?;
            return Some(GroupEditDesc { owner, group_id });
        }
        if let Some(rest) = custom_id.strip_prefix("rolegroup_editrequired_") {
            let (owner, group_id) = owner_and_tail(rest)?;
            return Some(GroupEditRequired { owner, group_id });
        }
        if let Some(rest) = custom_id.strip_prefix("rolegroup_required_select_") {
            let (owner, group_id) = owner_and_tail(rest)?;
            return Some(GroupRequiredSelect { owner, group_id });
        }
        if let Some(rest) = custom_id.strip_prefix("ticket_create_panel_") {
            return Some(TicketCreatePanel { owner: parse_user(rest)? });
        }
        if let Some(rest) = custom_id.strip_prefix("ticket_panel_channel_") {
            return Some(TicketPanelChannelSelect { owner: parse_user(rest)? });
        }
        if let Some(rest) = custom_id.strip_prefix("ticket_manage_categories_") {
            return Some(TicketManageCategories { owner: parse_user(rest)? });
        }
        if let Some(rest) = custom_id.strip_prefix("ticket_customize_") {
            return Some(TicketCustomize { owner: parse_user(rest)? });
        }
        if let Some(rest) = custom_id.strip_prefix("ticket_stats_") {
            return Some(TicketStats { owner: parse_user(rest)? });
        }
        if let Some(rest) = custom_id.strip_prefix("ticket_delete_panel_") {
            return Some(TicketDeletePanel { owner: parse_user(rest)? });
        }
        if let Some(rest) = custom_id.strip_prefix("ticket_list_panels_") {
            return Some(TicketListPanels { owner: parse_user(rest)? });
        }
        if let Some(rest) = custom_id.strip_prefix("ticket_back_") {
            return Some(TicketBack { owner: parse_user(rest)? });
        }
        if let Some(rest) = custom_id.strip_prefix("category_create_") {
            return Some(CategoryCreate { owner: parse_user(rest)? });
        }
        if let Some(rest) = custom_id.strip_prefix("category_select_discord_") {
            return Some(CategoryTargetSelect { owner: parse_user(rest)? });
        }
        if let Some(rest) = custom_id.strip_prefix("category_style_select_") {
            let (owner, target) = rest.split_once('_')?;
            return Some(CategoryStyleSelect {
                owner: parse_user(owner)?,
                target: CategoryTarget::parse(target)?,
            });
        }
        if let Some(rest) = custom_id.strip_prefix("category_edit_style_select_") {
            let (owner, category_id) = owner_and_tail(rest)?;
            return Some(CategoryEditStyleSelect { owner, category_id });
        }
        if let Some(rest) = custom_id.strip_prefix("category_edit_discord_select_") {
            let (owner, category_id, style) = owner_middle_last(rest)?;
            return Some(CategoryEditTargetSelect {
                owner,
                category_id,
                style: parse_style(&style)?,
            });
        }
        if let Some(rest) = custom_id.strip_prefix("category_edit_select_") {
            return Some(CategoryEditSelect { owner: parse_user(rest)? });
        }
        if let Some(rest) = custom_id.strip_prefix("category_delete_confirm_") {
            let (owner, category_id) = owner_and_tail(rest)?;
            return Some(CategoryDeleteConfirm { owner, category_id });
        }
        if let Some(rest) = custom_id.strip_prefix("category_delete_select_") {
            return Some(CategoryDeleteSelect { owner: parse_user(rest)? });
        }
        if let Some(rest) = custom_id.strip_prefix("panel_customize_select_") {
            return Some(PanelCustomizeSelect { owner: parse_user(rest)? });
        }
        if let Some(rest) = custom_id.strip_prefix("panel_delete_confirm_") {
            let (owner, panel_id) = owner_and_tail(rest)?;
            return Some(PanelDeleteConfirm { owner, panel_id });
        }
        if let Some(rest) = custom_id.strip_prefix("panel_delete_select_") {
            return Some(PanelDeleteSelect { owner: parse_user(rest)? });
        }
        if let Some(rest) = custom_id.strip_prefix("create_ticket_") {
            if rest.is_empty() {
                return None;
            }
            return Some(CreateTicket { category_key: rest.to_string() });
        }
        if let Some(rest) = custom_id.strip_prefix("close_ticket_") {
            if rest.is_empty() {
                return None;
            }
            return Some(CloseTicket { ticket_id: rest.to_string() });
        }
        if let Some(rest) = custom_id.strip_prefix("confirm_close_") {
            if rest.is_empty() {
                return None;
            }
            return Some(ConfirmClose { ticket_id: rest.to_string() });
        }
        if let Some(rest) = custom_id.strip_prefix("rename_ticket_") {
            if rest.is_empty() {
                return None;
            }
            return Some(RenameTicket { ticket_id: rest.to_string() });
        }

        None
    }

    /// Access requirements enforced before the handler runs.
    ///
    /// Ticket close/rename ownership needs a repository read and is checked
    /// inside the handler instead.
    pub fn policy(&self) -> AccessPolicy {
        use ComponentIntent::*;
        match self {
            RoleRequestMenu { owner }
            | RoleRemoveMenu { owner }
            | RoleListMenu { owner }
            | RoleGroupRequest { owner, .. }
            | RoleSelect { owner }
            | RoleRemoveSelect { owner } => AccessPolicy::owned(*owner),

            ApproveRole { .. }
            | DenyRole { .. }
            | ApproveRemoval { .. }
            | DenyRemoval { .. }
            | ApproveGroup { .. }
            | DenyGroup { .. } => AccessPolicy::capability(Capability::ManageRoles),

            PendingRequests { owner }
            | PendingRefresh { owner }
            | PendingClear { owner }
            | PendingDelete { owner }
            | PendingDeleteSelect { owner } => {
                AccessPolicy::owned(*owner).with_capability(Capability::ManageRoles)
            }

            GroupCreate { owner }
            | GroupCreateSelect { owner }
            | GroupManage { owner }
            | GroupDeleteSelect { owner }
            | GroupEditName { owner, .. }
            | GroupEditDesc { owner, .. }
            | GroupEditRequired { owner, .. }
            | GroupRequiredSelect { owner, .. } => {
                AccessPolicy::owned(*owner).with_capability(Capability::Administrator)
            }

            TicketCreatePanel { owner }
            | TicketPanelChannelSelect { owner }
            | TicketManageCategories { owner }
            | TicketCustomize { owner }
            | TicketStats { owner }
            | TicketDeletePanel { owner }
            | TicketListPanels { owner }
            | TicketBack { owner }
            | CategoryCreate { owner }
            | CategoryTargetSelect { owner }
            | CategoryStyleSelect { owner, .. }
            | CategoryEditSelect { owner }
            | CategoryEditStyleSelect { owner, .. }
            | CategoryEditTargetSelect { owner, .. }
            | CategoryDeleteSelect { owner }
            | CategoryDeleteConfirm { owner, .. }
            | PanelCustomizeSelect { owner }
            | PanelDeleteSelect { owner }
            | PanelDeleteConfirm { owner, .. } => {
                AccessPolicy::owned(*owner).with_capability(Capability::ManageChannels)
            }

            CreateTicket { .. }
            | CloseTicket { .. }
            | ConfirmClose { .. }
            | CancelClose
            | RenameTicket { .. } => AccessPolicy::open(),
        }
    }
}

impl ModalIntent {
    /// Build the custom id attached to a modal
    pub fn encode(&self) -> String {
        use ModalIntent::*;
        match self {
            RoleSearch { owner } => format!("role_search_modal_{owner}"),
            GroupNameInput { owner, group_id } => format!("rolegroup_nameinput_{owner}_{group_id}"),
            GroupDescInput { owner, group_id } => format!("rolegroup_descinput_{owner}_{group_id}"),
            PanelSetup { owner, channel_id } => format!("ticket_panel_setup_{owner}_{channel_id}"),
            PanelCustomize { owner, panel_id } => {
                format!("panel_customize_modal_{owner}_{panel_id}")
            }
            CategoryCreate { owner, target, style } => {
                format!("category_create_modal_{owner}_{}_{style}", target.encode())
            }
            CategoryEdit { owner, category_id, style, target } => format!(
                "category_edit_modal_{owner}_{}_{style}_{}",
                compact_category_id(category_id),
                target.encode()
            ),
            TicketRename { ticket_id } => format!("ticket_rename_modal_{ticket_id}"),
        }
    }

    /// Parse an incoming modal custom id
    pub fn parse(custom_id: &str) -> Option<Self> {
        use ModalIntent::*;

        if let Some(rest) = custom_id.strip_prefix("role_search_modal_") {
            return Some(RoleSearch { owner: parse_user(rest)? });
        }
        if let Some(rest) = custom_id.strip_prefix("rolegroup_nameinput_") {
            let (owner, group_id) = owner_and_tail(rest)?;
            return Some(GroupNameInput { owner, group_id });
        }
        if let Some(rest) = custom_id.strip_prefix("rolegroup_descinput_") {
            let (owner, group_id) = owner_and_tail(rest)?;
            return Some(GroupDescInput { owner, group_id });
        }
        if let Some(rest) = custom_id.strip_prefix("ticket_panel_setup_") {
            let (owner, channel) = rest.split_once('_')?;
            return Some(PanelSetup {
                owner: parse_user(owner)?,
                channel_id: ChannelId::new(channel.parse::<u64>().ok()?),
            });
        }
        if let Some(rest) = custom_id.strip_prefix("panel_customize_modal_") {
            let (owner, panel_id) = owner_and_tail(rest)?;
            return Some(PanelCustomize { owner, panel_id });
        }
        if let Some(rest) = custom_id.strip_prefix("category_create_modal_") {
            let (owner, target, style) = owner_middle_last(rest)?;
            return Some(CategoryCreate {
                owner,
                target: CategoryTarget::parse(&target)?,
                style: parse_style(&style)?,
            });
        }
        if let Some(rest) = custom_id.strip_prefix("category_edit_modal_") {
            // {owner}_{categoryId}_{style}_{target}; only the category id may
            // contain delimiters, and uuid ids travel compacted
            let (owner, tail) = rest.split_once('_')?;
            let (tail, target) = tail.rsplit_once('_')?;
            let (category_id, style) = tail.rsplit_once('_')?;
            if category_id.is_empty() {
                return None;
            }
            return Some(CategoryEdit {
                owner: parse_user(owner)?,
                category_id: expand_category_id(category_id),
                style: parse_style(style)?,
                target: CategoryTarget::parse(target)?,
            });
        }
        if let Some(rest) = custom_id.strip_prefix("ticket_rename_modal_") {
            if rest.is_empty() {
                return None;
            }
            return Some(TicketRename { ticket_id: rest.to_string() });
        }

        None
    }

    /// Access requirements enforced before the handler runs
    pub fn policy(&self) -> AccessPolicy {
        use ModalIntent::*;
        match self {
            RoleSearch { owner } => AccessPolicy::owned(*owner),
            GroupNameInput { owner, .. } | GroupDescInput { owner, .. } => {
                AccessPolicy::owned(*owner).with_capability(Capability::Administrator)
            }
            PanelSetup { owner, .. }
            | PanelCustomize { owner, .. }
            | CategoryCreate { owner, .. }
            | CategoryEdit { owner, .. } => {
                AccessPolicy::owned(*owner).with_capability(Capability::ManageChannels)
            }
            TicketRename { .. } => AccessPolicy::open(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(n: u64) -> UserId {
        UserId::new(n)
    }

    #[test]
    fn component_round_trip() {
        let samples = vec![
            ComponentIntent::RoleRequestMenu { owner: user(123456789012345678) },
            ComponentIntent::RoleRemoveMenu { owner: user(1) },
            ComponentIntent::RoleRemoveSelect { owner: user(1) },
            ComponentIntent::RoleGroupRequest {
                owner: user(42),
                group_id: "rg_550e8400-e29b-41d4-a716-446655440000".to_string(),
            },
            ComponentIntent::ApproveRole {
                requester: user(111222333444555666),
                role_id: RoleId::new(999888777666555444),
            },
            ComponentIntent::DenyGroup {
                requester: user(7),
                group_id: "rg_abc-def".to_string(),
            },
            ComponentIntent::PendingDeleteSelect { owner: user(3) },
            ComponentIntent::PendingDelete { owner: user(3) },
            ComponentIntent::GroupCreateSelect { owner: user(9) },
            ComponentIntent::GroupEditName {
                owner: user(9),
                group_id: "rg_x-y".to_string(),
            },
            ComponentIntent::GroupEditRequired {
                owner: user(9),
                group_id: "rg_550e8400-e29b-41d4-a716-446655440000".to_string(),
            },
            ComponentIntent::GroupRequiredSelect {
                owner: user(9),
                group_id: "rg_x-y".to_string(),
            },
            ComponentIntent::TicketPanelChannelSelect { owner: user(5) },
            ComponentIntent::CategoryStyleSelect {
                owner: user(5),
                target: CategoryTarget::Channel(ChannelId::new(42)),
            },
            ComponentIntent::CategoryStyleSelect {
                owner: user(5),
                target: CategoryTarget::Default,
            },
            ComponentIntent::CategoryEditTargetSelect {
                owner: user(5),
                category_id: "tc_11111111-2222-3333-4444-555555555555".to_string(),
                style: 3,
            },
            ComponentIntent::CategoryDeleteConfirm {
                owner: user(5),
                category_id: "tc_a-b".to_string(),
            },
            ComponentIntent::PanelDeleteConfirm {
                owner: user(5),
                panel_id: "tp_c-d".to_string(),
            },
            ComponentIntent::CreateTicket { category_key: "support".to_string() },
            ComponentIntent::CloseTicket { ticket_id: "ticket-support-1700000000".to_string() },
            ComponentIntent::ConfirmClose { ticket_id: "ticket-support-1700000000".to_string() },
            ComponentIntent::CancelClose,
            ComponentIntent::RenameTicket { ticket_id: "ticket-billing-1700000001".to_string() },
        ];

        for intent in samples {
            let encoded = intent.encode();
            assert!(encoded.len() <= 100, "custom id too long: {encoded}");
            assert_eq!(ComponentIntent::parse(&encoded), Some(intent.clone()), "{encoded}");
        }
    }

    #[test]
    fn modal_round_trip() {
        let samples = vec![
            ModalIntent::RoleSearch { owner: user(123) },
            ModalIntent::GroupNameInput {
                owner: user(123),
                group_id: "rg_550e8400-e29b-41d4-a716-446655440000".to_string(),
            },
            ModalIntent::GroupDescInput { owner: user(123), group_id: "rg_a".to_string() },
            ModalIntent::PanelSetup { owner: user(123), channel_id: ChannelId::new(456) },
            ModalIntent::PanelCustomize { owner: user(123), panel_id: "tp_z-1".to_string() },
            ModalIntent::CategoryCreate {
                owner: user(123),
                target: CategoryTarget::Default,
                style: 2,
            },
            ModalIntent::CategoryEdit {
                owner: user(123),
                category_id: "tc_11111111-2222-3333-4444-555555555555".to_string(),
                style: 4,
                target: CategoryTarget::Channel(ChannelId::new(987654321)),
            },
            ModalIntent::TicketRename { ticket_id: "ticket-support-1700000000".to_string() },
        ];

        for intent in samples {
            let encoded = intent.encode();
            assert!(encoded.len() <= 100, "custom id too long: {encoded}");
            assert_eq!(ModalIntent::parse(&encoded), Some(intent.clone()), "{encoded}");
        }
    }

    #[test]
    fn db_row_ids_survive_their_own_delimiter() {
        // Row ids carry an underscore after the entity prefix; middle-field
        // parsing must not split on it.
        let intent = ComponentIntent::CategoryEditTargetSelect {
            owner: user(77),
            category_id: "tc_deadbeef-0000".to_string(),
            style: 1,
        };
        assert_eq!(
            ComponentIntent::parse("category_edit_discord_select_77_tc_deadbeef-0000_1"),
            Some(intent)
        );

        let modal = ModalIntent::CategoryEdit {
            owner: user(77),
            category_id: "tc_deadbeef-0000".to_string(),
            style: 2,
            target: CategoryTarget::Default,
        };
        assert_eq!(
            ModalIntent::parse("category_edit_modal_77_tc_deadbeef-0000_2_default"),
            Some(modal)
        );
    }

    #[test]
    fn edit_modal_token_fits_with_full_width_ids() {
        // Worst case: 20-digit snowflakes on both ends and a full uuid row
        // id. The category id travels as bare hex to stay under 100 chars.
        let intent = ModalIntent::CategoryEdit {
            owner: user(12345678901234567890),
            category_id: "tc_550e8400-e29b-41d4-a716-446655440000".to_string(),
            style: 2,
            target: CategoryTarget::Channel(ChannelId::new(12345678901234567891)),
        };
        let encoded = intent.encode();
        assert!(encoded.len() <= 100, "custom id is {} chars: {encoded}", encoded.len());
        assert_eq!(ModalIntent::parse(&encoded), Some(intent));

        // The default target variant is shorter still
        let intent = ModalIntent::CategoryEdit {
            owner: user(12345678901234567890),
            category_id: "tc_550e8400-e29b-41d4-a716-446655440000".to_string(),
            style: 4,
            target: CategoryTarget::Default,
        };
        let encoded = intent.encode();
        assert!(encoded.len() <= 100, "custom id is {} chars: {encoded}", encoded.len());
        assert_eq!(ModalIntent::parse(&encoded), Some(intent));
    }

    #[test]
    fn malformed_tokens_parse_to_none() {
        for id in [
            "",
            "role_request_",
            "role_request_notanumber",
            "approve_role_123",
            "approve_role_123_",
            "approve_role_123_xyz",
            "category_style_select_5_whatever",
            "category_edit_modal_5_tc_a_9_default", // style out of range
            "create_ticket_",
            "unrelated_button",
            "tk:iface:new",
        ] {
            assert_eq!(ComponentIntent::parse(id), None, "{id}");
        }

        for id in ["", "role_search_modal_x", "ticket_rename_modal_", "category_create_modal_5_default"] {
            assert_eq!(ModalIntent::parse(id), None, "{id}");
        }
    }

    #[test]
    fn prefix_overlaps_resolve_to_the_specific_family() {
        assert_eq!(
            ComponentIntent::parse("role_remove_select_42"),
            Some(ComponentIntent::RoleRemoveSelect { owner: user(42) })
        );
        assert_eq!(
            ComponentIntent::parse("role_remove_42"),
            Some(ComponentIntent::RoleRemoveMenu { owner: user(42) })
        );
        assert_eq!(
            ComponentIntent::parse("pending_delete_select_42"),
            Some(ComponentIntent::PendingDeleteSelect { owner: user(42) })
        );
        assert_eq!(
            ComponentIntent::parse("pending_delete_42"),
            Some(ComponentIntent::PendingDelete { owner: user(42) })
        );
        assert_eq!(
            ComponentIntent::parse("rolegroup_create_select_42"),
            Some(ComponentIntent::GroupCreateSelect { owner: user(42) })
        );
        assert_eq!(
            ComponentIntent::parse("rolegroup_create_42"),
            Some(ComponentIntent::GroupCreate { owner: user(42) })
        );
        assert_eq!(
            ComponentIntent::parse("category_delete_confirm_42_tc_a"),
            Some(ComponentIntent::CategoryDeleteConfirm {
                owner: user(42),
                category_id: "tc_a".to_string()
            })
        );
        assert_eq!(
            ComponentIntent::parse("category_delete_select_42"),
            Some(ComponentIntent::CategoryDeleteSelect { owner: user(42) })
        );
    }
}
