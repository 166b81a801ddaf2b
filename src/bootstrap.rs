use chrono::Utc;
use uuid::Uuid;

use crate::{
    auth,
    domain::{CreatePackageRequest, Package, Role, User},
    error::Result,
    repository::{PackageRepository, UserRepository},
};

pub const ADMIN_EMAIL: &str = "admin@holidayexplorer.com";

/// Operational default for the seeded admin account, expected to be rotated
/// after first login. Not a secret.
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

/// Runs once at process start, before the listener is bound. Both steps check
/// for existing data first, so re-running against the same database is a
/// no-op.
pub async fn run(users: &dyn UserRepository, packages: &dyn PackageRepository) -> Result<()> {
    if !users.admin_exists().await? {
        users
            .create(User {
                id: Uuid::new_v4(),
                email: ADMIN_EMAIL.to_string(),
                password_hash: auth::hash_password(DEFAULT_ADMIN_PASSWORD)?,
                role: Role::Admin,
                name: "Admin User".to_string(),
                created_at: Utc::now(),
            })
            .await?;
        tracing::info!("Admin user created: {}", ADMIN_EMAIL);
    }

    if packages.count().await? == 0 {
        for request in sample_packages() {
            packages.create(Package::new(request)).await?;
        }
        tracing::info!("Sample packages initialized");
    }

    Ok(())
}

fn sample_packages() -> Vec<CreatePackageRequest> {
    vec![
        CreatePackageRequest {
            title: "Rajasthan Royal Heritage".to_string(),
            description: "Experience the royal grandeur of Rajasthan with palace stays, desert safaris, and cultural shows.".to_string(),
            price: 15999,
            duration: "7 Days / 6 Nights".to_string(),
            image: "https://images.unsplash.com/photo-1554263762-17f646b8a3fe?crop=entropy&cs=srgb&fm=jpg&q=85".to_string(),
            highlights: vec![
                "Udaipur City Palace".to_string(),
                "Jaisalmer Desert".to_string(),
                "Jodhpur Fort".to_string(),
            ],
            rating: 4.8,
            category: "heritage".to_string(),
            featured: true,
        },
        CreatePackageRequest {
            title: "Kerala Backwaters Bliss".to_string(),
            description: "Sail through serene backwaters, stay in houseboats, and explore spice plantations in God's Own Country.".to_string(),
            price: 12999,
            duration: "6 Days / 5 Nights".to_string(),
            image: "https://images.unsplash.com/photo-1685850749074-9cf8023d7e8d?crop=entropy&cs=srgb&fm=jpg&q=85".to_string(),
            highlights: vec![
                "Alleppey Houseboats".to_string(),
                "Munnar Tea Gardens".to_string(),
                "Kochi Heritage".to_string(),
            ],
            rating: 4.9,
            category: "nature".to_string(),
            featured: true,
        },
        CreatePackageRequest {
            title: "Himalayan Adventure".to_string(),
            description: "Trek through breathtaking mountain trails, visit ancient monasteries, and witness spectacular sunrises.".to_string(),
            price: 18999,
            duration: "8 Days / 7 Nights".to_string(),
            image: "https://images.unsplash.com/photo-1745737204244-db3bbf72e3fa?crop=entropy&cs=srgb&fm=jpg&q=85".to_string(),
            highlights: vec![
                "Manali Valley".to_string(),
                "Rohtang Pass".to_string(),
                "Dharamshala Monasteries".to_string(),
            ],
            rating: 4.7,
            category: "adventure".to_string(),
            featured: true,
        },
        CreatePackageRequest {
            title: "Golden Triangle Classic".to_string(),
            description: "Discover India's most iconic destinations - Delhi, Agra, and Jaipur in this classic circuit.".to_string(),
            price: 13999,
            duration: "6 Days / 5 Nights".to_string(),
            image: "https://images.unsplash.com/photo-1664081507458-94de02277afe?crop=entropy&cs=srgb&fm=jpg&q=85".to_string(),
            highlights: vec![
                "Taj Mahal".to_string(),
                "Red Fort".to_string(),
                "Amber Palace".to_string(),
            ],
            rating: 4.6,
            category: "heritage".to_string(),
            featured: false,
        },
    ]
}
