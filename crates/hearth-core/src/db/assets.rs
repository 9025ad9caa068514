//! Manual asset operations

use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::debug;

use super::{parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{Asset, AssetType, NewAsset};

const ASSET_COLUMNS: &str = "id, name, asset_type, value, ownership_percentage, linked_account_id, \
     manual_mortgage_balance, interest_rate, monthly_payment, created_at";

fn row_to_asset(row: &Row) -> rusqlite::Result<Asset> {
    let asset_type: String = row.get(2)?;
    let created_at_str: String = row.get(9)?;
    Ok(Asset {
        id: row.get(0)?,
        name: row.get(1)?,
        asset_type: asset_type.parse().unwrap_or(AssetType::Other),
        value: row.get(3)?,
        ownership_percentage: row.get(4)?,
        linked_account_id: row.get(5)?,
        manual_mortgage_balance: row.get(6)?,
        interest_rate: row.get(7)?,
        monthly_payment: row.get(8)?,
        created_at: parse_datetime(&created_at_str),
    })
}

pub(super) fn query_assets(conn: &Connection, id: Option<i64>) -> Result<Vec<Asset>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM assets WHERE (?1 IS NULL OR id = ?1) ORDER BY name, id",
        ASSET_COLUMNS
    ))?;

    let assets = stmt
        .query_map(params![id], row_to_asset)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(assets)
}

impl Database {
    /// Validate an asset and the account it links to
    ///
    /// A link must point at an existing loan or mortgage account that no other
    /// asset already claims. `asset_id` is the asset being updated, if any.
    fn check_asset(&self, asset: NewAsset, asset_id: Option<i64>) -> Result<NewAsset> {
        let asset = asset.validate()?;

        if let Some(linked_id) = asset.linked_account_id {
            let account = self.get_account(linked_id)?.ok_or_else(|| {
                Error::InvalidData(format!("Linked account {} does not exist", linked_id))
            })?;
            if !account.account_type.is_linkable_liability() {
                return Err(Error::InvalidData(format!(
                    "Account {} is a {} account; only loan or mortgage accounts can back an asset",
                    linked_id, account.account_type
                )));
            }

            let conn = self.conn()?;
            let claimed_by: Option<String> = conn
                .query_row(
                    "SELECT name FROM assets WHERE linked_account_id = ?1 AND (?2 IS NULL OR id != ?2) LIMIT 1",
                    params![linked_id, asset_id],
                    |row| row.get(0),
                )
                .optional()?;
            if let Some(other) = claimed_by {
                return Err(Error::InvalidData(format!(
                    "Account {} is already linked to asset '{}'",
                    linked_id, other
                )));
            }
        }

        Ok(asset)
    }

    /// Create an asset
    pub fn create_asset(&self, asset: NewAsset) -> Result<Asset> {
        let asset = self.check_asset(asset, None)?;
        let conn = self.conn()?;

        conn.execute(
            r#"
            INSERT INTO assets (name, asset_type, value, ownership_percentage, linked_account_id,
                                manual_mortgage_balance, interest_rate, monthly_payment)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                asset.name,
                asset.asset_type.as_str(),
                asset.value,
                asset.ownership_percentage,
                asset.linked_account_id,
                asset.manual_mortgage_balance,
                asset.interest_rate,
                asset.monthly_payment,
            ],
        )?;
        let id = conn.last_insert_rowid();
        debug!(id, name = %asset.name, "Created asset");

        self.get_asset(id)?
            .ok_or_else(|| Error::NotFound(format!("Asset {}", id)))
    }

    /// Replace an asset's fields
    pub fn update_asset(&self, id: i64, asset: NewAsset) -> Result<Asset> {
        let asset = self.check_asset(asset, Some(id))?;
        let conn = self.conn()?;

        let changed = conn.execute(
            r#"
            UPDATE assets SET
                name = ?, asset_type = ?, value = ?, ownership_percentage = ?,
                linked_account_id = ?, manual_mortgage_balance = ?, interest_rate = ?,
                monthly_payment = ?, updated_at = CURRENT_TIMESTAMP
            WHERE id = ?
            "#,
            params![
                asset.name,
                asset.asset_type.as_str(),
                asset.value,
                asset.ownership_percentage,
                asset.linked_account_id,
                asset.manual_mortgage_balance,
                asset.interest_rate,
                asset.monthly_payment,
                id,
            ],
        )?;

        if changed == 0 {
            return Err(Error::NotFound(format!("Asset {}", id)));
        }

        self.get_asset(id)?
            .ok_or_else(|| Error::NotFound(format!("Asset {}", id)))
    }

    /// Delete an asset. Returns false if it didn't exist.
    pub fn delete_asset(&self, id: i64) -> Result<bool> {
        let conn = self.conn()?;
        let changed = conn.execute("DELETE FROM assets WHERE id = ?", params![id])?;
        Ok(changed > 0)
    }

    /// Get an asset by ID
    pub fn get_asset(&self, id: i64) -> Result<Option<Asset>> {
        let conn = self.conn()?;
        Ok(query_assets(&conn, Some(id))?.into_iter().next())
    }

    /// List all assets
    pub fn list_assets(&self) -> Result<Vec<Asset>> {
        let conn = self.conn()?;
        query_assets(&conn, None)
    }
}
