/// Detail fields requested for every unique place, in output column order
pub const DETAIL_FIELDS: &[&str] = &[
    "place_id",
    "name",
    "business_status",
    "formatted_address",
    "website",
    "formatted_phone_number",
    "address_components",
    "adr_address",
    "geometry",
    "icon",
    "icon_mask_base_uri",
    "icon_background_color",
    "permanently_closed",
    "photos",
    "plus_code",
    "types",
    "url",
    "utc_offset",
    "vicinity",
    "wheelchair_accessible_entrance",
    "current_opening_hours",
    "international_phone_number",
    "opening_hours",
    "secondary_opening_hours",
    "curbside_pickup",
    "delivery",
    "dine_in",
    "editorial_summary",
    "price_level",
    "rating",
    "reservable",
    "reviews",
    "serves_beer",
    "serves_breakfast",
    "serves_brunch",
    "serves_dinner",
    "serves_lunch",
    "serves_vegetarian_food",
    "serves_wine",
    "takeout",
    "user_ratings_total",
];

/// The `fields` query parameter for a details request
pub fn detail_fields_param() -> String {
    DETAIL_FIELDS.join(",")
}
