/// Active listings with a seller summary, newest first. NULL filter
/// parameters are skipped; species and suburb match as case-insensitive
/// substrings.
pub const LIST_ACTIVE_LISTINGS: &str = r#"
    SELECT l.id, l.title, l.description, l.species, l.height, l.trunk_diameter,
        l.canopy_width, l.age, l.health_status, l.address, l.suburb, l.state,
        l.postcode, l.latitude, l.longitude, l.pricing_type, l.price, l.status,
        l.images, l.pickup_windows, l.seller_id, l.created_at, l.updated_at,
        l.expires_at,
        u.name AS seller_name, u.business_name AS seller_business_name
    FROM listings l
    JOIN users u ON u.id = l.seller_id
    WHERE l.status = 'active'
      AND ($1::text IS NULL OR l.species ILIKE '%' || $1 || '%')
      AND ($2::text IS NULL OR l.suburb ILIKE '%' || $2 || '%')
      AND ($3::text IS NULL OR l.state = $3)
      AND ($4::pricing_type IS NULL OR l.pricing_type = $4)
    ORDER BY l.created_at DESC
"#;

/// One listing by id.
pub const GET_LISTING: &str = r#"
    SELECT id, title, description, species, height, trunk_diameter,
        canopy_width, age, health_status, address, suburb, state, postcode,
        latitude, longitude, pricing_type, price, status, images,
        pickup_windows, seller_id, created_at, updated_at, expires_at
    FROM listings
    WHERE id = $1
"#;

/// Public profile fields of a listing's seller.
pub const GET_SELLER_PROFILE: &str = r#"
    SELECT name, business_name, email
    FROM users
    WHERE id = $1
"#;

/// Top bids for a listing, amount descending, with the bidder's name.
pub const GET_TOP_BIDS: &str = r#"
    SELECT b.id, b.listing_id, b.bidder_id, b.amount, b.message, b.status,
        b.seq, b.created_at,
        u.name AS bidder_name
    FROM bids b
    JOIN users u ON u.id = b.bidder_id
    WHERE b.listing_id = $1
    ORDER BY b.amount DESC
    LIMIT $2
"#;

/// Ledger head for a listing: highest amount and last occupied position.
pub const GET_LEDGER_HEAD: &str = r#"
    SELECT MAX(amount) AS highest_amount, COALESCE(MAX(seq), 0) AS seq
    FROM bids
    WHERE listing_id = $1
"#;
