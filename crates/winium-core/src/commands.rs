//! Winium-specific commands layered on top of the base registry.
//!
//! Every extension command is a `POST` under
//! `/session/{sessionId}/element/{id}/...`. They are registered into an
//! executor's [`CommandRegistry`] once, before the session is opened.

use winium_remote::{CommandInfo, CommandRegistry, HttpVerb, RemoteError};

/// Names of the Winium extension commands.
pub mod names {
    pub const FIND_DATA_GRID_CELL: &str = "findDataGridCell";
    pub const GET_DATA_GRID_COLUMN_COUNT: &str = "getDataGridColumnCount";
    pub const GET_DATA_GRID_ROW_COUNT: &str = "getDataGridRowCount";
    pub const SCROLL_TO_DATA_GRID_CELL: &str = "scrollToDataGridCell";
    pub const SELECT_DATA_GRID_CELL: &str = "selectDataGridCell";
    pub const SCROLL_TO_LIST_BOX_ITEM: &str = "scrollToListBoxItem";
    pub const FIND_MENU_ITEM: &str = "findMenuItem";
    pub const SELECT_MENU_ITEM: &str = "selectMenuItem";
    pub const IS_COMBO_BOX_EXPANDED: &str = "isComboBoxExpanded";
    pub const EXPAND_COMBO_BOX: &str = "expandComboBox";
    pub const COLLAPSE_COMBO_BOX: &str = "collapseComboBox";
    pub const FIND_COMBO_BOX_SELECTED_ITEM: &str = "findComboBoxSelectedItem";
    pub const SCROLL_TO_COMBO_BOX_ITEM: &str = "scrollToComboBoxItem";
}

/// URL placeholders used by the extension templates besides `sessionId`.
pub mod params {
    pub const ID: &str = "id";
    pub const ROW: &str = "row";
    pub const COLUMN: &str = "column";
    pub const PATH: &str = "path";
}

const fn post(url_template: &'static str) -> CommandInfo {
    CommandInfo::new(HttpVerb::Post, url_template)
}

/// The extension command table.
pub const WINIUM_COMMANDS: &[(&str, CommandInfo)] = &[
    (
        names::FIND_DATA_GRID_CELL,
        post("/session/{sessionId}/element/{id}/datagrid/cell/{row}/{column}"),
    ),
    (
        names::GET_DATA_GRID_COLUMN_COUNT,
        post("/session/{sessionId}/element/{id}/datagrid/column/count"),
    ),
    (
        names::GET_DATA_GRID_ROW_COUNT,
        post("/session/{sessionId}/element/{id}/datagrid/row/count"),
    ),
    (
        names::SCROLL_TO_DATA_GRID_CELL,
        post("/session/{sessionId}/element/{id}/datagrid/scroll/{row}/{column}"),
    ),
    (
        names::SELECT_DATA_GRID_CELL,
        post("/session/{sessionId}/element/{id}/datagrid/select/{row}/{column}"),
    ),
    (
        names::SCROLL_TO_LIST_BOX_ITEM,
        post("/session/{sessionId}/element/{id}/listbox/scroll"),
    ),
    (
        names::FIND_MENU_ITEM,
        post("/session/{sessionId}/element/{id}/menu/item/{path}"),
    ),
    (
        names::SELECT_MENU_ITEM,
        post("/session/{sessionId}/element/{id}/menu/select/{path}"),
    ),
    (
        names::IS_COMBO_BOX_EXPANDED,
        post("/session/{sessionId}/element/{id}/combobox/expanded"),
    ),
    (
        names::EXPAND_COMBO_BOX,
        post("/session/{sessionId}/element/{id}/combobox/expand"),
    ),
    (
        names::COLLAPSE_COMBO_BOX,
        post("/session/{sessionId}/element/{id}/combobox/collapse"),
    ),
    (
        names::FIND_COMBO_BOX_SELECTED_ITEM,
        post("/session/{sessionId}/element/{id}/combobox/items/selected"),
    ),
    (
        names::SCROLL_TO_COMBO_BOX_ITEM,
        post("/session/{sessionId}/element/{id}/combobox/scroll"),
    ),
];

/// Add every Winium extension command to `registry`.
///
/// All or nothing: if any name is already registered, the registry is left
/// untouched and [`RemoteError::DuplicateCommand`] names the collision.
pub fn register_winium_commands(registry: &mut CommandRegistry) -> Result<(), RemoteError> {
    registry.try_add_all(WINIUM_COMMANDS)
}
