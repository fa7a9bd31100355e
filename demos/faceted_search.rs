//! Faceted product search against an in-memory engine and record store.
//!
//! Run with `RUST_LOG=debug cargo run --example faceted_search` to see the
//! compiled requests and the spellcheck retry.

use std::sync::Arc;

use log::info;
use pike::prelude::*;
use pike::search::{SearchHit, SortDirection, SpellcheckResult};

#[derive(Debug, Clone)]
struct Product {
    id: i64,
    name: &'static str,
    brand: &'static str,
    price: u32,
}

impl Keyed for Product {
    fn primary_key(&self) -> PrimaryKey {
        PrimaryKey::Int(self.id)
    }
}

fn catalog() -> Vec<Product> {
    vec![
        Product { id: 1, name: "Steel kettle", brand: "acme", price: 40 },
        Product { id: 2, name: "Glass kettle", brand: "globex", price: 55 },
        Product { id: 3, name: "Travel kettle", brand: "acme", price: 25 },
        Product { id: 4, name: "Teapot", brand: "initech", price: 30 },
    ]
}

/// Scripted engine answers: a misspelled query with a collation, then the
/// corrected query's hits.
fn engine() -> MemoryTransport {
    let misspelled = SearchResult::empty().with_spellcheck(
        SpellcheckResult::default()
            .with_suggestion("ketle", vec!["kettle".to_string()])
            .with_collation("kettle", Some(3)),
    );

    let facets = FacetSet::new()
        .with(
            "brand-field",
            FacetResult::Field(vec![FacetValueCount::new("acme", 2), FacetValueCount::new("globex", 1)]),
        )
        .with(
            "price-multiquery",
            FacetResult::MultiQuery(vec![
                FacetValueCount::new("price-multiquery-0", 2),
                FacetValueCount::new("price-multiquery-1", 1),
            ]),
        );
    let mut corrected = SearchResult::empty().with_total(3).with_facets(facets);
    corrected.hits = vec![
        SearchHit::new(3).with_type("products").with_score(2.4),
        SearchHit::new(1).with_type("products").with_score(1.9),
        SearchHit::new(2).with_type("products").with_score(1.2),
    ];

    MemoryTransport::with_responses([misspelled, corrected])
}

fn main() -> Result<()> {
    env_logger::init();

    let config = SearchConfig::from_json_str(r#"{ "paginate_size": 10 }"#)?;
    let transport = Arc::new(engine());
    let executor = SearchExecutor::new(transport.clone(), config);
    let store = MemoryStore::new("mysql", catalog());

    let builder = QueryBuilder::new("ketle")
        .for_type("products")
        .where_in("brand", ["acme", "globex"])
        .where_range("price", 0, 100)
        .facet_field("brand")
        .facet_query("price", "price:[0 TO 50]")
        .facet_query("price", "price:[50 TO *]")
        .order_by("score", SortDirection::Desc)
        .spellcheck_auto_retry();

    let builder_facets = builder.facets().to_vec();
    let request = executor.build_request(&builder, None)?;
    for (name, value) in request.to_params()? {
        info!("{name}={value}");
    }

    let products = executor.get(builder, &store)?;
    if let Some(corrected) = products.corrected_query() {
        println!("Showing results for '{corrected}'");
    }
    for product in &products {
        println!("#{} {} ({}, ${})", product.id, product.name, product.brand, product.price);
    }

    let price_spec = builder_facets.iter().find(|spec| matches!(spec, FacetSpec::Query { .. }));
    if let Some(counts) = price_spec.and_then(|spec| products.facets().counts(&spec.key())) {
        for count in counts {
            println!("{}: {}", count.value, count.count);
        }
    }
    for (key, facet) in products.facets().iter() {
        println!("{key}: {facet:?}");
    }
    println!("{} of {} matches", products.len(), products.total());

    Ok(())
}
