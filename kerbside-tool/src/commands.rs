use kerbside_core::{Bin, FillLevel, NewBin, Priority, valid_coordinate};
use kerbside_rest::BinsClient;

use crate::error::KerbError;

pub async fn list(client: &BinsClient) -> Result<(), KerbError> {
    let mut bins = client.list_bins().await?;
    bins.sort_by(|a, b| a.id.cmp(&b.id));
    print!("{}", format_table(&bins));
    Ok(())
}

pub async fn add(
    client: &BinsClient,
    lat: f64,
    lng: f64,
    fill: Option<u8>,
    priority: Priority,
) -> Result<(), KerbError> {
    let new = new_bin(lat, lng, fill, priority)?;
    let bin = client.create_bin(&new).await?;
    println!("Added bin {} at ({}, {})", bin.id, bin.lat, bin.lng);
    Ok(())
}

pub async fn delete(client: &BinsClient, id: &str) -> Result<(), KerbError> {
    client.delete_bin(id).await?;
    println!("Deleted bin {}", id);
    Ok(())
}

pub async fn set_priority(client: &BinsClient, id: &str, priority: Priority) -> Result<(), KerbError> {
    client.update_priority(id, priority).await?;
    println!("Bin {} priority set to {}", id, priority);
    Ok(())
}

fn new_bin(lat: f64, lng: f64, fill: Option<u8>, priority: Priority) -> Result<NewBin, KerbError> {
    if !valid_coordinate(lat, lng) {
        return Err(KerbError::InvalidArgument(format!(
            "({}, {}) is not a coordinate",
            lat, lng
        )));
    }
    let fill_level = match fill {
        Some(percent) if percent > FillLevel::MAX.percent() => {
            return Err(KerbError::InvalidArgument(format!(
                "fill level {} is above 100",
                percent
            )));
        }
        Some(percent) => FillLevel::new(percent),
        None => FillLevel::random(),
    };
    Ok(NewBin {
        lat,
        lng,
        fill_level,
        priority,
    })
}

fn format_table(bins: &[Bin]) -> String {
    if bins.is_empty() {
        return "No bins\n".to_string();
    }

    let id_width = bins
        .iter()
        .map(|b| b.id.chars().count())
        .max()
        .unwrap_or(0)
        .max(2);

    let mut out = format!(
        "{:<id_width$}  {:>10}  {:>10}  {:>5}  {:<8}  {}\n",
        "ID", "LAT", "LNG", "FILL", "STATUS", "PRIORITY"
    );
    for bin in bins {
        out.push_str(&format!(
            "{:<id_width$}  {:>10.5}  {:>10.5}  {:>5}  {:<8}  {}\n",
            bin.id,
            bin.lat,
            bin.lng,
            bin.fill_level.to_string(),
            bin.fill_level.status().as_str(),
            bin.priority
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_lists_every_bin() {
        let bins = vec![
            Bin {
                id: "BIN-7".to_string(),
                lat: 6.93,
                lng: 79.86,
                fill_level: FillLevel::new(85),
                priority: Priority::High,
            },
            Bin {
                id: "B2".to_string(),
                lat: -1.5,
                lng: 36.8,
                fill_level: FillLevel::new(5),
                priority: Priority::Low,
            },
        ];
        let table = format_table(&bins);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("ID     "));
        assert!(lines[1].starts_with("BIN-7"));
        assert!(lines[1].contains("85%"));
        assert!(lines[1].contains("critical"));
        assert!(lines[1].ends_with("high"));
        assert!(lines[2].contains("normal"));
    }

    #[test]
    fn empty_table() {
        assert_eq!(format_table(&[]), "No bins\n");
    }

    #[test]
    fn new_bin_validates_input() {
        assert!(matches!(
            new_bin(91.0, 0.0, None, Priority::Low),
            Err(KerbError::InvalidArgument(_))
        ));
        assert!(matches!(
            new_bin(0.0, 0.0, Some(101), Priority::Low),
            Err(KerbError::InvalidArgument(_))
        ));

        let new = new_bin(6.93, 79.86, Some(40), Priority::Medium).unwrap();
        assert_eq!(new.fill_level.percent(), 40);
        assert_eq!(new.priority, Priority::Medium);
        assert!(new_bin(0.0, 0.0, None, Priority::Low).unwrap().fill_level <= FillLevel::MAX);
    }
}
