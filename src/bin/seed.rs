use devstore_api::{
    config::AppConfig,
    db::{create_pool, run_migrations},
    services::auth_service::hash_password,
};
use uuid::Uuid;

const SEED_CATEGORY: &str = "camisas";
const SIZES: [&str; 3] = ["P", "M", "G"];
const STOCK_PER_SIZE: i32 = 10;

struct SeedProduct {
    label: &'static str,
    price: i64,
    description: &'static str,
    tech: &'static str,
}

const PRODUCTS: [SeedProduct; 4] = [
    SeedProduct {
        label: "Camisa RN",
        price: 8990,
        description: "Camisa com estampa de React Native, perfeita para desenvolvedores",
        tech: "react",
    },
    SeedProduct {
        label: "Camisa React",
        price: 9450,
        description: "Camisa com logo do React, ideal para front-end developers",
        tech: "react",
    },
    SeedProduct {
        label: "Camisa Python",
        price: 7999,
        description: "Camisa com design Python, para programadores Python",
        tech: "python",
    },
    SeedProduct {
        label: "Camisa PHP",
        price: 6990,
        description: "Camisa com estampa PHP, para desenvolvedores web",
        tech: "php",
    },
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    run_migrations(&pool).await?;

    let seeded: Option<Uuid> = sqlx::query_scalar("SELECT id FROM categories WHERE slug = $1")
        .bind(SEED_CATEGORY)
        .fetch_optional(&pool)
        .await?;
    if seeded.is_some() {
        println!("Database already seeded, skipping");
        return Ok(());
    }

    let mut tx = pool.begin().await?;
    let admin_id = ensure_admin(&mut tx, "admin@devstore.com", "admin123").await?;
    seed_store(&mut tx).await?;
    seed_banners(&mut tx).await?;
    let category_id = seed_catalog_structure(&mut tx).await?;
    seed_products(&mut tx, category_id).await?;
    tx.commit().await?;

    println!("Seed completed. Admin ID: {admin_id}");
    println!("Login: admin@devstore.com / admin123");
    Ok(())
}

type Tx = sqlx::Transaction<'static, sqlx::Postgres>;

async fn ensure_admin(tx: &mut Tx, email: &str, password: &str) -> anyhow::Result<Uuid> {
    let password_hash = hash_password(password)?;

    let id: Uuid = sqlx::query_scalar(
        r#"
        INSERT INTO users (id, name, email, password_hash, role)
        VALUES ($1, 'Admin', $2, $3, 'admin')
        ON CONFLICT (email) DO UPDATE SET role = EXCLUDED.role
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(password_hash)
    .fetch_one(&mut **tx)
    .await?;

    println!("Ensured admin {email}");
    Ok(id)
}

async fn seed_store(tx: &mut Tx) -> anyhow::Result<()> {
    let store_id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO stores (id, topbar_text, topbar_text_en, instagram, facebook, email, whatsapp, copyright, copyright_en)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        "#,
    )
    .bind(store_id)
    .bind("Frete grátis para compras acima de R$ 299")
    .bind("Free shipping on orders over $299")
    .bind("https://instagram.com/devstore")
    .bind("https://facebook.com/devstore")
    .bind("contato@devstore.com")
    .bind("https://wa.me/5511999999999")
    .bind("© 2026 DevStore. Todos os direitos reservados.")
    .bind("© 2026 DevStore. All rights reserved.")
    .execute(&mut **tx)
    .await?;

    let benefits = [
        ("truck", "Frete grátis", "Free shipping", "Frete grátis em pedidos acima de R$ 299", "Free shipping on orders over $299"),
        ("shield-check", "Pagamento seguro", "Secure payment", "Pagamento seguro com cartão de crédito, débito e boleto", "Secure payment with credit card, debit card and boleto"),
        ("headphones", "Suporte 24/7", "24/7 support", "Suporte 24 horas por dia com email e telefone", "24/7 support with email and phone"),
        ("percent", "Descontos e promoções", "Discounts and promotions", "Descontos e promoções para clientes regulares", "Discounts and promotions for regular customers"),
    ];

    for (position, (icon, title, title_en, description, description_en)) in benefits.into_iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO store_benefits (id, store_id, icon_name, title, title_en, description, description_en, sort_order)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(store_id)
        .bind(icon)
        .bind(title)
        .bind(title_en)
        .bind(description)
        .bind(description_en)
        .bind(position as i32 + 1)
        .execute(&mut **tx)
        .await?;
    }

    println!("Seeded store info and benefits");
    Ok(())
}

async fn seed_banners(tx: &mut Tx) -> anyhow::Result<()> {
    let banners = [
        ("banner_promo_1.jpg", "/categories/camisas"),
        ("banner_promo_2.jpg", "/categories/algo"),
    ];

    for (img, link) in banners {
        sqlx::query("INSERT INTO banners (id, img, link) VALUES ($1, $2, $3)")
            .bind(Uuid::new_v4())
            .bind(img)
            .bind(link)
            .execute(&mut **tx)
            .await?;
    }

    println!("Seeded banners");
    Ok(())
}

async fn seed_catalog_structure(tx: &mut Tx) -> anyhow::Result<Uuid> {
    let category_id = Uuid::new_v4();
    sqlx::query("INSERT INTO categories (id, name, name_en, slug) VALUES ($1, 'Camisas', 'Shirts', $2)")
        .bind(category_id)
        .bind(SEED_CATEGORY)
        .execute(&mut **tx)
        .await?;

    sqlx::query(
        "INSERT INTO category_metadata (id, category_id, name, name_en) VALUES ('tech', $1, 'Tecnologia', 'Technology')",
    )
    .bind(category_id)
    .execute(&mut **tx)
    .await?;

    for (id, label) in [("node", "Node"), ("react", "React"), ("python", "Python"), ("php", "PHP")] {
        sqlx::query(
            "INSERT INTO metadata_values (id, category_metadata_id, label) VALUES ($1, 'tech', $2)",
        )
        .bind(id)
        .bind(label)
        .execute(&mut **tx)
        .await?;
    }

    println!("Seeded category and facets");
    Ok(category_id)
}

async fn seed_products(tx: &mut Tx, category_id: Uuid) -> anyhow::Result<()> {
    for product in PRODUCTS {
        let product_id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO products (id, category_id, label, price, description)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(product_id)
        .bind(category_id)
        .bind(product.label)
        .bind(product.price)
        .bind(product.description)
        .execute(&mut **tx)
        .await?;

        for n in 1..=2 {
            sqlx::query("INSERT INTO product_images (id, product_id, url) VALUES ($1, $2, $3)")
                .bind(Uuid::new_v4())
                .bind(product_id)
                .bind(format!("product_{product_id}_{n}.jpg"))
                .execute(&mut **tx)
                .await?;
        }

        for size in SIZES {
            sqlx::query(
                "INSERT INTO product_variants (id, product_id, size, stock) VALUES ($1, $2, $3, $4)",
            )
            .bind(Uuid::new_v4())
            .bind(product_id)
            .bind(size)
            .bind(STOCK_PER_SIZE)
            .execute(&mut **tx)
            .await?;
        }

        sqlx::query(
            r#"
            INSERT INTO product_metadata (id, product_id, category_metadata_id, metadata_value_id)
            VALUES ($1, $2, 'tech', $3)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(product_id)
        .bind(product.tech)
        .execute(&mut **tx)
        .await?;
    }

    println!("Seeded {} products", PRODUCTS.len());
    Ok(())
}
