//! Element handles, locators and the typed Winium extension calls.

use std::fmt;

use serde_json::{Map, Value};
use winium_remote::RemoteError;
use winium_remote::response::element_id;

use super::WiniumDriver;
use crate::commands::{names, params};
use crate::error::WiniumError;

/// Separator Winium uses between menu path segments.
pub const MENU_PATH_SEPARATOR: &str = "$";

/// Opaque id of an element inside a session.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementId(String);

impl ElementId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub(crate) fn from_value(value: &Value) -> Result<Self, WiniumError> {
        Ok(Self(element_id(value)?))
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A `(strategy, value)` pair for element lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    pub using: String,
    pub value: String,
}

impl Locator {
    pub fn new(using: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            using: using.into(),
            value: value.into(),
        }
    }

    /// UI Automation `AutomationId`.
    pub fn id(value: impl Into<String>) -> Self {
        Self::new("id", value)
    }

    pub fn name(value: impl Into<String>) -> Self {
        Self::new("name", value)
    }

    pub fn class_name(value: impl Into<String>) -> Self {
        Self::new("class name", value)
    }

    pub fn xpath(value: impl Into<String>) -> Self {
        Self::new("xpath", value)
    }

    pub(crate) fn to_parameters(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("using".to_string(), Value::String(self.using.clone()));
        map.insert("value".to_string(), Value::String(self.value.clone()));
        map
    }
}

fn element_params(element: &ElementId) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert(params::ID.to_string(), Value::String(element.0.clone()));
    map
}

fn cell_params(element: &ElementId, row: u32, column: u32) -> Map<String, Value> {
    let mut map = element_params(element);
    map.insert(params::ROW.to_string(), row.into());
    map.insert(params::COLUMN.to_string(), column.into());
    map
}

fn menu_params(element: &ElementId, path: &[&str]) -> Map<String, Value> {
    let mut map = element_params(element);
    map.insert(
        params::PATH.to_string(),
        Value::String(path.join(MENU_PATH_SEPARATOR)),
    );
    map
}

fn locator_params(element: &ElementId, locator: &Locator) -> Map<String, Value> {
    let mut map = locator.to_parameters();
    map.insert(params::ID.to_string(), Value::String(element.0.clone()));
    map
}

fn expect_u64(command: &str, value: &Value) -> Result<u64, WiniumError> {
    value.as_u64().ok_or_else(|| {
        RemoteError::MalformedResponse(format!("{command}: expected a count, got {value}")).into()
    })
}

fn expect_bool(command: &str, value: &Value) -> Result<bool, WiniumError> {
    value.as_bool().ok_or_else(|| {
        RemoteError::MalformedResponse(format!("{command}: expected a boolean, got {value}"))
            .into()
    })
}

// ---------------------------------------------------------------------------
// Data grid
// ---------------------------------------------------------------------------

impl WiniumDriver {
    /// The cell at `(row, column)` of a data grid.
    pub async fn find_data_grid_cell(
        &self,
        grid: &ElementId,
        row: u32,
        column: u32,
    ) -> Result<ElementId, WiniumError> {
        let value = self
            .execute(names::FIND_DATA_GRID_CELL, cell_params(grid, row, column))
            .await?;
        ElementId::from_value(&value)
    }

    pub async fn data_grid_column_count(&self, grid: &ElementId) -> Result<u64, WiniumError> {
        let value = self
            .execute(names::GET_DATA_GRID_COLUMN_COUNT, element_params(grid))
            .await?;
        expect_u64(names::GET_DATA_GRID_COLUMN_COUNT, &value)
    }

    pub async fn data_grid_row_count(&self, grid: &ElementId) -> Result<u64, WiniumError> {
        let value = self
            .execute(names::GET_DATA_GRID_ROW_COUNT, element_params(grid))
            .await?;
        expect_u64(names::GET_DATA_GRID_ROW_COUNT, &value)
    }

    pub async fn scroll_to_data_grid_cell(
        &self,
        grid: &ElementId,
        row: u32,
        column: u32,
    ) -> Result<(), WiniumError> {
        self.execute(names::SCROLL_TO_DATA_GRID_CELL, cell_params(grid, row, column))
            .await?;
        Ok(())
    }

    pub async fn select_data_grid_cell(
        &self,
        grid: &ElementId,
        row: u32,
        column: u32,
    ) -> Result<(), WiniumError> {
        self.execute(names::SELECT_DATA_GRID_CELL, cell_params(grid, row, column))
            .await?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // List box
    // -----------------------------------------------------------------------

    /// Scroll a list box until the item matching `item` is visible.
    pub async fn scroll_to_list_box_item(
        &self,
        list: &ElementId,
        item: &Locator,
    ) -> Result<ElementId, WiniumError> {
        let value = self
            .execute(names::SCROLL_TO_LIST_BOX_ITEM, locator_params(list, item))
            .await?;
        ElementId::from_value(&value)
    }

    // -----------------------------------------------------------------------
    // Menu
    // -----------------------------------------------------------------------

    /// Find a menu item by its header path, e.g. `&["File", "Open"]`.
    pub async fn find_menu_item(
        &self,
        menu: &ElementId,
        path: &[&str],
    ) -> Result<ElementId, WiniumError> {
        let value = self
            .execute(names::FIND_MENU_ITEM, menu_params(menu, path))
            .await?;
        ElementId::from_value(&value)
    }

    /// Open every level of `path` and click the last item.
    pub async fn select_menu_item(
        &self,
        menu: &ElementId,
        path: &[&str],
    ) -> Result<ElementId, WiniumError> {
        let value = self
            .execute(names::SELECT_MENU_ITEM, menu_params(menu, path))
            .await?;
        ElementId::from_value(&value)
    }

    // -----------------------------------------------------------------------
    // Combo box
    // -----------------------------------------------------------------------

    pub async fn is_combo_box_expanded(&self, combo: &ElementId) -> Result<bool, WiniumError> {
        let value = self
            .execute(names::IS_COMBO_BOX_EXPANDED, element_params(combo))
            .await?;
        expect_bool(names::IS_COMBO_BOX_EXPANDED, &value)
    }

    pub async fn expand_combo_box(&self, combo: &ElementId) -> Result<(), WiniumError> {
        self.execute(names::EXPAND_COMBO_BOX, element_params(combo))
            .await?;
        Ok(())
    }

    pub async fn collapse_combo_box(&self, combo: &ElementId) -> Result<(), WiniumError> {
        self.execute(names::COLLAPSE_COMBO_BOX, element_params(combo))
            .await?;
        Ok(())
    }

    /// The selected item, or `None` when nothing is selected.
    pub async fn find_combo_box_selected_item(
        &self,
        combo: &ElementId,
    ) -> Result<Option<ElementId>, WiniumError> {
        let value = self
            .execute(names::FIND_COMBO_BOX_SELECTED_ITEM, element_params(combo))
            .await?;
        if value.is_null() {
            return Ok(None);
        }
        ElementId::from_value(&value).map(Some)
    }

    pub async fn scroll_to_combo_box_item(
        &self,
        combo: &ElementId,
        item: &Locator,
    ) -> Result<ElementId, WiniumError> {
        let value = self
            .execute(names::SCROLL_TO_COMBO_BOX_ITEM, locator_params(combo, item))
            .await?;
        ElementId::from_value(&value)
    }
}
