use odot_cds::{Client, ClientConfig};

#[tokio::main]
async fn main() {
    // ログ設定
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let mut client = Client::new(&ClientConfig::from_env()).expect("Failed to create client");

    println!("=== CDS Options Test ===\n");

    match client.counties().await {
        Ok(counties) => {
            println!("郡: {}件", counties.len());
            for (code, name) in &counties {
                println!("  {}: {}", code, name);
            }
        }
        Err(e) => eprintln!("エラー: {}", e),
    }

    match client.cities().await {
        Ok(cities) => println!("市: {}件", cities.len()),
        Err(e) => eprintln!("エラー: {}", e),
    }

    match client.highways().await {
        Ok(highways) => {
            println!("国道: {}件", highways.len());
            for (code, name) in highways.iter().take(5) {
                println!("  {} ({})", name, code);
            }
        }
        Err(e) => eprintln!("エラー: {}", e),
    }

    match client.streets("Multnomah", "Portland").await {
        Ok(streets) => println!("Portland の通り: {}件", streets.len()),
        Err(e) => eprintln!("エラー: {}", e),
    }
}
