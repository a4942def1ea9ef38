use crate::models::Advertisement;
use redb::{Database, ReadableTable, TableDefinition};
use uuid::Uuid;

use super::stories_db_operations::DbError;

// Keyed by an insertion sequence number rather than the UUID so the
// collection has a stable order; rotation offsets index into that order.
pub const ADS: TableDefinition<u64, &str> = TableDefinition::new("ads");

/// Reads every advertisement in collection (insertion) order.
pub fn read_all_ads(db: &Database) -> Result<Vec<Advertisement>, DbError> {
    let read_txn = db.begin_read()?;
    let ads_table = read_txn.open_table(ADS)?;
    let ads = ads_table
        .iter()?
        .filter_map(|res| res.ok())
        .filter_map(|(_, ad_str)| serde_json::from_str(ad_str.value()).ok())
        .collect();
    Ok(ads)
}

pub fn create_ad(db: &Database, mut ad: Advertisement) -> Result<String, DbError> {
    ad.id = Uuid::new_v4().to_string();
    let ad_json = serde_json::to_string(&ad)?;

    let write_txn = db.begin_write()?;
    {
        let mut ads_table = write_txn.open_table(ADS)?;
        let next_key = ads_table
            .last()?
            .map(|(key, _)| key.value() + 1)
            .unwrap_or(0);
        ads_table.insert(next_key, ad_json.as_str())?;
    }
    write_txn.commit()?;
    Ok(ad.id)
}

pub fn update_ad(db: &Database, ad_id: &str, mut ad: Advertisement) -> Result<(), DbError> {
    let key = find_key(db, ad_id)?.ok_or_else(|| DbError::NotFound(ad_id.to_string()))?;
    ad.id = ad_id.to_string();
    let ad_json = serde_json::to_string(&ad)?;

    let write_txn = db.begin_write()?;
    {
        let mut ads_table = write_txn.open_table(ADS)?;
        ads_table.insert(key, ad_json.as_str())?;
    }
    write_txn.commit()?;
    Ok(())
}

pub fn delete_ad(db: &Database, ad_id: &str) -> Result<(), DbError> {
    let key = match find_key(db, ad_id)? {
        Some(key) => key,
        None => return Ok(()), // already gone
    };

    let write_txn = db.begin_write()?;
    {
        let mut ads_table = write_txn.open_table(ADS)?;
        ads_table.remove(key)?;
    }
    write_txn.commit()?;
    Ok(())
}

fn find_key(db: &Database, ad_id: &str) -> Result<Option<u64>, DbError> {
    let read_txn = db.begin_read()?;
    let ads_table = read_txn.open_table(ADS)?;
    for item in ads_table.iter()? {
        let (key, ad_str) = item?;
        if let Ok(ad) = serde_json::from_str::<Advertisement>(ad_str.value()) {
            if ad.id == ad_id {
                return Ok(Some(key.value()));
            }
        }
    }
    Ok(None)
}

/// Seeds the nine default restaurant ads, but only when the collection is
/// empty so repeated setup runs never duplicate them. Returns whether
/// anything was written.
pub fn seed_default_ads(db: &Database) -> Result<bool, DbError> {
    {
        let read_txn = db.begin_read()?;
        let table_result = read_txn.open_table(ADS);
        if let Ok(ads_table) = table_result {
            if !ads_table.is_empty()? {
                return Ok(false);
            }
        }
    }

    let write_txn = db.begin_write()?;
    {
        let mut ads_table = write_txn.open_table(ADS)?;
        for (position, ad) in default_ads().into_iter().enumerate() {
            let ad_json = serde_json::to_string(&ad)?;
            ads_table.insert(position as u64, ad_json.as_str())?;
        }
    }
    write_txn.commit()?;
    Ok(true)
}

fn restaurant_ad(name: &str, offer: &str, address: &str, link: &str, content: &str) -> Advertisement {
    Advertisement {
        id: Uuid::new_v4().to_string(),
        restaurant_name: name.to_string(),
        offer: offer.to_string(),
        address: address.to_string(),
        menu_link: link.to_string(),
        content: content.to_string(),
        button_label: "View Menu".to_string(),
        is_active: true,
    }
}

pub fn default_ads() -> Vec<Advertisement> {
    vec![
        restaurant_ad(
            "The Driving Diner",
            "20% OFF for New Drivers",
            "123 Main St, Downtown",
            "https://example.com/menu1",
            "Perfect place to relax after your driving lessons. Join us for a quick bite!",
        ),
        restaurant_ad(
            "Roadside Cafe",
            "Free Coffee with Any Meal",
            "456 Highway Ave, North Side",
            "https://example.com/menu2",
            "Cozy cafe with great views. Popular with driving test takers!",
        ),
        restaurant_ad(
            "Pizza Palace",
            "Buy 1 Get 1 Free Pizza",
            "789 Oak Road, Central",
            "https://example.com/menu3",
            "Fresh, delicious pizza made daily. Come celebrate your driving success!",
        ),
        restaurant_ad(
            "Burger Blast",
            "15% Discount on Total Bill",
            "321 Elm Street, Westside",
            "https://example.com/menu4",
            "Authentic burgers and shakes. Best comfort food in town!",
        ),
        restaurant_ad(
            "Sushi Express",
            "Free Appetizer with Purchase",
            "654 Pine Lane, Midtown",
            "https://example.com/menu5",
            "Fresh sushi and Japanese cuisine. Perfect for a special celebration!",
        ),
        restaurant_ad(
            "Taco Paradise",
            "Happy Hour 4-6 PM Daily",
            "987 Cedar Court, South Bay",
            "https://example.com/menu6",
            "Authentic Mexican flavors and great atmosphere. Fiesta time!",
        ),
        restaurant_ad(
            "Steak House Prime",
            "Complimentary Dessert",
            "111 Maple Road, Premium District",
            "https://example.com/menu7",
            "Fine dining experience with premium steaks and wine selection.",
        ),
        restaurant_ad(
            "Pasta Perfetto",
            "Family Bundle Deal - Save 25%",
            "222 Birch Avenue, Italian Quarter",
            "https://example.com/menu8",
            "Homemade Italian pasta and sauces. Taste authenticity!",
        ),
        restaurant_ad(
            "Organic Greens",
            "10% Off First Order",
            "333 Spruce Street, Health District",
            "https://example.com/menu9",
            "Farm-to-table organic cuisine. Healthy and delicious!",
        ),
    ]
}
