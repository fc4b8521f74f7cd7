use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use grammar::{impl_convert, Field, Grammar, Marshal, Result, TypeDescriptor};

#[derive(Clone, Default)]
struct User {
    id: u32,
    name: String,
    email: String,
    active: bool,
}

#[derive(Clone, Default)]
struct Product {
    sku: String,
    name: String,
    price: f64,
    quantity: u32,
}

#[derive(Clone, Default)]
struct Catalogue {
    owner: User,
    products: Vec<Product>,
    tags: Vec<String>,
}

impl Marshal for User {
    fn describe() -> Result<TypeDescriptor<Self>> {
        TypeDescriptor::builder("User")
            .field(Field::new("id", |u: &User| &u.id, |u: &mut User| &mut u.id))
            .field(Field::new("name", |u: &User| &u.name, |u: &mut User| &mut u.name))
            .field(Field::new("email", |u: &User| &u.email, |u: &mut User| &mut u.email))
            .field(Field::new("active", |u: &User| &u.active, |u: &mut User| &mut u.active))
            .build()
    }

    fn zero() -> Self {
        User::default()
    }
}

impl Marshal for Product {
    fn describe() -> Result<TypeDescriptor<Self>> {
        TypeDescriptor::builder("Product")
            .field(Field::new("sku", |p: &Product| &p.sku, |p: &mut Product| &mut p.sku))
            .field(Field::new("name", |p: &Product| &p.name, |p: &mut Product| &mut p.name))
            .field(Field::new("price", |p: &Product| &p.price, |p: &mut Product| &mut p.price))
            .field(Field::new("quantity", |p: &Product| &p.quantity, |p: &mut Product| &mut p.quantity))
            .build()
    }

    fn zero() -> Self {
        Product::default()
    }
}

impl Marshal for Catalogue {
    fn describe() -> Result<TypeDescriptor<Self>> {
        TypeDescriptor::builder("Catalogue")
            .field(Field::new("owner", |c: &Catalogue| &c.owner, |c: &mut Catalogue| &mut c.owner))
            .field(Field::new("products", |c: &Catalogue| &c.products, |c: &mut Catalogue| &mut c.products))
            .field(Field::new("tags", |c: &Catalogue| &c.tags, |c: &mut Catalogue| &mut c.tags))
            .build()
    }

    fn zero() -> Self {
        Catalogue::default()
    }
}

impl_convert!(User, Product);

fn user() -> User {
    User {
        id: 123,
        name: "Alice".to_string(),
        email: "alice@example.com".to_string(),
        active: true,
    }
}

fn catalogue(size: u32) -> Catalogue {
    Catalogue {
        owner: user(),
        products: (0..size)
            .map(|i| Product {
                sku: format!("SKU{}", i),
                name: format!("Product {}", i),
                price: 9.99 + f64::from(i),
                quantity: i,
            })
            .collect(),
        tags: vec!["important".to_string(), "verified".to_string()],
    }
}

fn benchmark_marshal_simple(c: &mut Criterion) {
    let grammar = Grammar::new();
    let user = user();

    c.bench_function("marshal_simple_struct", |b| {
        b.iter(|| grammar.marshal(black_box(&user)))
    });
}

fn benchmark_unmarshal_simple(c: &mut Criterion) {
    let grammar = Grammar::new();
    let map = grammar.marshal(&user()).unwrap();

    c.bench_function("unmarshal_simple_struct", |b| {
        b.iter(|| grammar.unmarshal::<User>(black_box(&map)))
    });
}

fn benchmark_marshal_nested(c: &mut Criterion) {
    let grammar = Grammar::new();
    let mut group = c.benchmark_group("marshal_nested");

    for size in [10, 50, 100, 500].iter() {
        let data = catalogue(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &data, |b, data| {
            b.iter(|| grammar.marshal(black_box(data)))
        });
    }
    group.finish();
}

fn benchmark_unmarshal_nested(c: &mut Criterion) {
    let grammar = Grammar::new();
    let mut group = c.benchmark_group("unmarshal_nested");

    for size in [10, 50, 100, 500].iter() {
        let map = grammar.marshal(&catalogue(*size)).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(size), &map, |b, map| {
            b.iter(|| grammar.unmarshal::<Catalogue>(black_box(map)))
        });
    }
    group.finish();
}

fn benchmark_unmarshal_in_place(c: &mut Criterion) {
    let grammar = Grammar::new();
    let map = grammar.marshal(&catalogue(100)).unwrap();
    let mut target = catalogue(100);

    c.bench_function("unmarshal_into_existing", |b| {
        b.iter(|| grammar.unmarshal_into(&mut target, black_box(&map)))
    });
}

fn benchmark_descriptor_lookup(c: &mut Criterion) {
    let grammar = Grammar::new();
    grammar.descriptor::<Catalogue>().unwrap();

    c.bench_function("cached_descriptor_lookup", |b| {
        b.iter(|| grammar.descriptor::<Catalogue>())
    });
}

criterion_group!(
    benches,
    benchmark_marshal_simple,
    benchmark_unmarshal_simple,
    benchmark_marshal_nested,
    benchmark_unmarshal_nested,
    benchmark_unmarshal_in_place,
    benchmark_descriptor_lookup
);
criterion_main!(benches);
