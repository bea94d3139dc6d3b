//! Build a small page fragment and print its markup

use hydra_dom::{
    create, Attributes, ContentValue, DomArena, DomSerializer, ElementSink, SerializerConfig,
    SubElementSpec,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .init();

    let mut dom = DomArena::new();

    let mut attrs = Attributes::new();
    attrs.insert("class".to_string(), "card".into());
    attrs.insert(
        "data-built".to_string(),
        ContentValue::thunk(|| "lazily".into()),
    );

    let content = ContentValue::keyed(vec![
        ("h2", SubElementSpec::new("Groceries")),
        (
            "list",
            SubElementSpec::tagged(
                "ul.items",
                ContentValue::list(vec![
                    SubElementSpec::tagged("li", "milk"),
                    SubElementSpec::tagged("li.urgent", "eggs"),
                ]),
            ),
        ),
    ]);

    let card = create(&mut dom, "div.shadow[id=groceries]", &content, Some(&attrs))?;
    let root = dom.root_id();
    dom.append_child(root, card)?;

    let html = DomSerializer::with_config(SerializerConfig::pretty()).outer_html(&dom, root)?;
    println!("{}", html);

    Ok(())
}
