use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::Arc;
use tokio::sync::RwLock;

use rmcp::{
    ErrorData as McpError, RoleServer, ServerHandler,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{
        CallToolResult, Content, Implementation, ListResourceTemplatesResult, ListResourcesResult,
        PaginatedRequestParams, ProtocolVersion, RawResource, RawResourceTemplate,
        ReadResourceRequestParams, ReadResourceResult, Resource, ResourceContents,
        ResourceTemplate, ServerCapabilities, ServerInfo,
    },
    schemars,
    service::RequestContext,
    tool, tool_handler, tool_router,
};

use crate::config::types::SearchConfig;
use crate::domain::booking::BookingLedger;
use crate::domain::criteria::{FilterCriteria, PriceRange, SortMode};
use crate::domain::destination::search_destinations;
use crate::domain::filter::{collect_amenity_vocabulary, evaluate, price_bounds};
use crate::domain::listing::{CURRENCY_SYMBOL, Listing};
use crate::domain::search_query::{GuestCount, SearchQuery};
use crate::error::HomestayError;
use crate::ports::listing_source::ListingSource;

const BOOKINGS_URI: &str = "homestay://bookings";

// ---------- Resource Store ----------

/// Rendered tool output kept around as MCP resources, keyed by URI.
#[derive(Clone, Default)]
pub struct ResourceStore {
    entries: Arc<RwLock<BTreeMap<String, ResourceEntry>>>,
}

#[derive(Clone)]
struct ResourceEntry {
    name: String,
    text: String,
}

impl ResourceStore {
    async fn insert(&self, uri: impl Into<String>, name: impl Into<String>, text: String) {
        self.entries.write().await.insert(
            uri.into(),
            ResourceEntry {
                name: name.into(),
                text,
            },
        );
    }

    async fn get(&self, uri: &str) -> Option<ResourceEntry> {
        self.entries.read().await.get(uri).cloned()
    }

    async fn list(&self) -> Vec<(String, String)> {
        self.entries
            .read()
            .await
            .iter()
            .map(|(uri, entry)| (uri.clone(), entry.name.clone()))
            .collect()
    }
}

impl std::fmt::Debug for ResourceStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceStore").finish()
    }
}

// ---------- Tool parameter types ----------

#[derive(Debug, Default, serde::Deserialize, schemars::JsonSchema)]
pub struct SearchToolParams {
    /// Destination or free text (e.g. "Goa", "North Goa", "riverside"). An exact location
    /// match takes priority over matches in titles and descriptions.
    pub query: Option<String>,
    /// Listing page query string to start from (e.g. "q=Goa&checkIn=2025-06-01&checkOut=2025-06-05&guests=2,1").
    /// Explicit parameters below override what it sets.
    pub search: Option<String>,
    /// Minimum nightly price in rupees (inclusive)
    pub min_price: Option<f64>,
    /// Maximum nightly price in rupees (inclusive)
    pub max_price: Option<f64>,
    /// Amenities that must all be present (e.g. `["wifi", "pool"]`)
    pub amenities: Option<Vec<String>>,
    /// Only show instantly bookable homestays
    pub instant_only: Option<bool>,
    /// Minimum guest capacity (e.g. 4 for "4+ guests")
    pub guests: Option<u32>,
    /// Sort order: recommended (default), price-ascending, price-descending, rating-descending
    pub sort: Option<SortMode>,
    /// Maximum number of results to show
    pub limit: Option<usize>,
}

#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct ListingToolParams {
    /// Homestay listing ID from search results
    pub id: String,
}

#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct DestinationsToolParams {
    /// Part of a destination name (e.g. "go"). Omit to list every destination.
    pub query: Option<String>,
}

#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct BookToolParams {
    /// Homestay listing ID to book
    pub id: String,
    /// Check-in date (YYYY-MM-DD). Must be paired with `check_out`.
    pub check_in: Option<String>,
    /// Check-out date (YYYY-MM-DD). Must be after `check_in`.
    pub check_out: Option<String>,
    /// Number of adult guests
    pub adults: Option<u32>,
    /// Number of children
    pub children: Option<u32>,
}

#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct CancelBookingToolParams {
    /// Booking ID returned by `homestay_book`
    pub booking_id: u64,
}

// ---------- MCP Server ----------

#[derive(Clone)]
pub struct HomestayMcpServer {
    source: Arc<dyn ListingSource>,
    bookings: Arc<BookingLedger>,
    search_config: SearchConfig,
    tool_router: ToolRouter<Self>,
    resources: ResourceStore,
}

impl SearchToolParams {
    fn to_criteria(&self, guest_buckets: &[u32]) -> crate::error::Result<FilterCriteria> {
        let mut criteria = match self.search.as_deref() {
            Some(search) => {
                let seed = SearchQuery::parse(search)?;
                seed.validate()?;
                seed.to_criteria(guest_buckets)
            }
            None => FilterCriteria::default(),
        };
        if let Some(ref query) = self.query {
            criteria = criteria.with_text_query(query.clone());
        }
        if self.min_price.is_some() || self.max_price.is_some() {
            criteria = criteria.with_price_range(
                self.min_price.unwrap_or(PriceRange::ANY.min),
                self.max_price.unwrap_or(PriceRange::ANY.max),
            );
        }
        if let Some(ref amenities) = self.amenities {
            criteria = criteria.with_amenities(amenities.iter().map(|a| a.trim().to_string()));
        }
        if let Some(instant_only) = self.instant_only {
            criteria = criteria.with_instant_only(instant_only);
        }
        if let Some(guests) = self.guests {
            criteria = criteria.with_min_guests((guests > 0).then_some(guests));
        }
        if let Some(sort) = self.sort {
            criteria = criteria.with_sort(sort);
        }
        Ok(criteria)
    }
}

/// `homestay://search/{query}`, with every other non-default criterion appended
/// as query parameters so differently filtered runs get their own resource.
/// Repeating an identical search replaces its earlier entry.
fn search_resource_uri(criteria: &FilterCriteria) -> String {
    let query = criteria.normalized_query().unwrap_or_else(|| "all".into());
    let mut uri = format!(
        "homestay://search/{}",
        url::form_urlencoded::byte_serialize(query.as_bytes()).collect::<String>()
    );

    let mut params = url::form_urlencoded::Serializer::new(String::new());
    let range = criteria.price_range;
    if range.min.is_finite() {
        params.append_pair("min_price", &range.min.to_string());
    }
    if range.max.is_finite() {
        params.append_pair("max_price", &range.max.to_string());
    }
    if let Some(guests) = criteria.min_guest_capacity {
        params.append_pair("guests", &guests.to_string());
    }
    if !criteria.required_amenities.is_empty() {
        let amenities: Vec<&str> = criteria.required_amenities.iter().map(String::as_str).collect();
        params.append_pair("amenities", &amenities.join(","));
    }
    if criteria.instant_only {
        params.append_pair("instant_only", "true");
    }
    if criteria.sort_mode != SortMode::default() {
        params.append_pair("sort", criteria.sort_mode.as_str());
    }
    let params = params.finish();
    if !params.is_empty() {
        uri.push('?');
        uri.push_str(&params);
    }
    uri
}

fn render_results(listings: &[Listing], criteria: &FilterCriteria, limit: Option<usize>) -> String {
    let mut text = String::new();
    if listings.is_empty() {
        text.push_str("No homestays found. Try adjusting your filters or search criteria.\n");
        return text;
    }
    if criteria.has_active_filters() {
        let _ = writeln!(text, "Found {} homestays ({criteria}):\n", listings.len());
    } else {
        let _ = writeln!(
            text,
            "Found {} homestays (no filters applied, {criteria}):\n",
            listings.len()
        );
    }
    let shown = limit.unwrap_or(listings.len()).min(listings.len());
    for (i, listing) in listings.iter().take(shown).enumerate() {
        let _ = write!(
            text,
            "{}. **{}** (ID: {})\n   {}\n   {CURRENCY_SYMBOL}{}/night",
            i + 1,
            listing.title,
            listing.id,
            listing.location,
            listing.price,
        );
        if let Some(rating) = listing.rating {
            let _ = write!(
                text,
                " | Rating: {rating:.1} ({} reviews)",
                listing.review_count.unwrap_or(0),
            );
        }
        if let Some(guests) = listing.max_guests() {
            let _ = write!(text, " | Up to {guests} guests");
        }
        if listing.instant_bookable {
            let _ = write!(text, " | Instant booking");
        }
        let _ = writeln!(text);
        if !listing.amenities.is_empty() {
            let _ = writeln!(text, "   Amenities: {}", listing.amenities.join(", "));
        }
        let _ = writeln!(text);
    }
    if shown < listings.len() {
        let _ = writeln!(
            text,
            "{} more homestays not shown. Raise `limit` to see them.",
            listings.len() - shown
        );
    }
    text
}

#[tool_router]
impl HomestayMcpServer {
    pub fn new(source: Arc<dyn ListingSource>, search_config: SearchConfig) -> Self {
        Self {
            source,
            bookings: Arc::new(BookingLedger::new()),
            search_config,
            tool_router: Self::tool_router(),
            resources: ResourceStore::default(),
        }
    }

    pub fn bookings(&self) -> &BookingLedger {
        &self.bookings
    }

    async fn find_listing(&self, id: &str) -> crate::error::Result<Listing> {
        self.source
            .load_listings()
            .await?
            .into_iter()
            .find(|l| l.id == id)
            .ok_or_else(|| HomestayError::ListingNotFound { id: id.to_string() })
    }

    fn render_bookings(&self) -> String {
        let bookings = self.bookings.list();
        if bookings.is_empty() {
            return "You have no bookings yet.\n".into();
        }
        let mut text = String::new();
        let _ = writeln!(text, "{} bookings:\n", bookings.len());
        for booking in &bookings {
            let _ = writeln!(text, "- {booking}");
        }
        text
    }

    /// Filter and sort the homestay catalogue.
    #[tool(
        name = "homestay_search",
        description = "Search homestays by destination or free text, with optional price range, required amenities, guest capacity, instant-booking filter and sort order. An exact destination match (e.g. \"Goa\") hides listings that only mention the text elsewhere. Start here to discover listing IDs.",
        annotations(read_only_hint = true, open_world_hint = false)
    )]
    async fn homestay_search(
        &self,
        Parameters(params): Parameters<SearchToolParams>,
    ) -> Result<CallToolResult, McpError> {
        let criteria = match params.to_criteria(&self.search_config.guest_buckets) {
            Ok(c) => c,
            Err(e) => {
                return Ok(CallToolResult::error(vec![Content::text(format!(
                    "Invalid search: {e}"
                ))]));
            }
        };

        let catalogue = match self.source.load_listings().await {
            Ok(listings) => listings,
            Err(e) => {
                return Ok(CallToolResult::error(vec![Content::text(format!(
                    "Failed to load homestays: {e}"
                ))]));
            }
        };

        let results = evaluate(&catalogue, &criteria);
        tracing::debug!(
            total = catalogue.len(),
            matched = results.len(),
            %criteria,
            "Evaluated homestay search"
        );
        let text = render_results(&results, &criteria, params.limit);

        let uri = search_resource_uri(&criteria);
        let name = format!("Search: {criteria}");
        self.resources.insert(uri, name, text.clone()).await;
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }

    /// Full description of one homestay.
    #[tool(
        name = "homestay_listing_details",
        description = "Get the full description of a homestay: location, price, rating, rooms and capacity, amenities and photo.",
        annotations(read_only_hint = true, open_world_hint = false)
    )]
    async fn homestay_listing_details(
        &self,
        Parameters(params): Parameters<ListingToolParams>,
    ) -> Result<CallToolResult, McpError> {
        match self.find_listing(&params.id).await {
            Ok(listing) => {
                let text = listing.details().to_string();
                let uri = format!("homestay://listing/{}", listing.id);
                let name = format!("Homestay: {}", listing.title);
                self.resources.insert(uri, name, text.clone()).await;
                Ok(CallToolResult::success(vec![Content::text(text)]))
            }
            Err(e) => Ok(CallToolResult::error(vec![Content::text(format!(
                "Failed to get homestay '{}': {e}",
                params.id
            ))])),
        }
    }

    /// Filter vocabulary: amenities and the price span of the catalogue.
    #[tool(
        name = "homestay_amenities",
        description = "List every amenity that appears in the homestay catalogue along with the lowest and highest nightly price. Use these values for the `amenities`, `min_price` and `max_price` search filters.",
        annotations(read_only_hint = true, open_world_hint = false)
    )]
    async fn homestay_amenities(&self) -> Result<CallToolResult, McpError> {
        let catalogue = match self.source.load_listings().await {
            Ok(listings) => listings,
            Err(e) => {
                return Ok(CallToolResult::error(vec![Content::text(format!(
                    "Failed to load homestays: {e}"
                ))]));
            }
        };

        let vocabulary = collect_amenity_vocabulary(&catalogue);
        let mut text = String::new();
        let _ = writeln!(text, "{} homestays in the catalogue.", catalogue.len());
        if let Some(bounds) = price_bounds(&catalogue) {
            let _ = writeln!(text, "Price range: {bounds} per night");
        }
        if vocabulary.is_empty() {
            text.push_str("No amenities listed.\n");
        } else {
            let amenities: Vec<&str> = vocabulary.iter().map(String::as_str).collect();
            let _ = writeln!(text, "Amenities: {}", amenities.join(", "));
        }
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }

    /// Destination picker.
    #[tool(
        name = "homestay_destinations",
        description = "List featured destinations, optionally narrowed by part of a name. Pass a destination to homestay_search as `query`.",
        annotations(read_only_hint = true, open_world_hint = false)
    )]
    async fn homestay_destinations(
        &self,
        Parameters(params): Parameters<DestinationsToolParams>,
    ) -> Result<CallToolResult, McpError> {
        let matches = search_destinations(params.query.as_deref().unwrap_or_default());
        let text = if matches.is_empty() {
            "No destinations match.\n".to_string()
        } else {
            format!("Destinations: {}\n", matches.join(", "))
        };
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }

    /// Book a homestay for the current session.
    #[tool(
        name = "homestay_book",
        description = "Book a homestay by listing ID, optionally with check-in/check-out dates (YYYY-MM-DD) and guest counts. Bookings live for the current session only.",
        annotations(read_only_hint = false, open_world_hint = false)
    )]
    async fn homestay_book(
        &self,
        Parameters(params): Parameters<BookToolParams>,
    ) -> Result<CallToolResult, McpError> {
        let guests = match (params.adults, params.children) {
            (None, None) => None,
            (adults, children) => Some(GuestCount {
                adults: adults.unwrap_or(0),
                children: children.unwrap_or(0),
            }),
        };
        let stay = match SearchQuery::from_parts(
            None,
            params.check_in.as_deref(),
            params.check_out.as_deref(),
            guests,
        ) {
            Ok(s) => s,
            Err(e) => {
                return Ok(CallToolResult::error(vec![Content::text(format!(
                    "Invalid booking: {e}"
                ))]));
            }
        };

        let listing = match self.find_listing(&params.id).await {
            Ok(l) => l,
            Err(e) => {
                return Ok(CallToolResult::error(vec![Content::text(format!(
                    "Failed to book homestay '{}': {e}",
                    params.id
                ))]));
            }
        };

        match self.bookings.book(&listing, &stay) {
            Ok(booking) => {
                tracing::info!(booking_id = booking.id, listing_id = %booking.listing_id, "Booked homestay");
                Ok(CallToolResult::success(vec![Content::text(format!(
                    "Booked: {booking}\n"
                ))]))
            }
            Err(e) => Ok(CallToolResult::error(vec![Content::text(format!(
                "Invalid booking: {e}"
            ))])),
        }
    }

    /// Bookings placed in this session.
    #[tool(
        name = "homestay_bookings",
        description = "List the homestays booked in this session, with dates, guests and total price.",
        annotations(read_only_hint = true, open_world_hint = false)
    )]
    async fn homestay_bookings(&self) -> Result<CallToolResult, McpError> {
        Ok(CallToolResult::success(vec![Content::text(
            self.render_bookings(),
        )]))
    }

    /// Cancel a booking.
    #[tool(
        name = "homestay_cancel_booking",
        description = "Cancel a booking by the booking ID returned from homestay_book.",
        annotations(read_only_hint = false, open_world_hint = false)
    )]
    async fn homestay_cancel_booking(
        &self,
        Parameters(params): Parameters<CancelBookingToolParams>,
    ) -> Result<CallToolResult, McpError> {
        match self.bookings.cancel(params.booking_id) {
            Ok(booking) => {
                tracing::info!(booking_id = booking.id, "Cancelled booking");
                Ok(CallToolResult::success(vec![Content::text(format!(
                    "Booking cancelled: {booking}\n"
                ))]))
            }
            Err(e) => Ok(CallToolResult::error(vec![Content::text(format!(
                "Failed to cancel booking: {e}"
            ))])),
        }
    }
}

#[tool_handler]
impl ServerHandler for HomestayMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(
                "Homestay MCP server for browsing, filtering and booking homestays.\n\
                 \n\
                 ## Browsing\n\
                 - homestay_destinations: featured destinations\n\
                 - homestay_amenities: amenity names and the catalogue price range, for filters\n\
                 - homestay_search: filter by destination/text, price, amenities, guests and instant booking; sort by recommended, price or rating\n\
                 - homestay_listing_details: full description of one homestay\n\
                 \n\
                 ## Booking\n\
                 - homestay_book: book a listing ID with optional dates and guests\n\
                 - homestay_bookings: list this session's bookings\n\
                 - homestay_cancel_booking: cancel by booking ID\n\
                 \n\
                 ## Tips\n\
                 - Searching an exact destination (\"Goa\") shows only homestays located there; \
                 use a partial term (\"go\") for a broader text match.\n\
                 - The recommended order ranks by rating multiplied by review count."
                    .into(),
            ),
        }
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, McpError> {
        let mut entries = self.resources.list().await;
        entries.push((BOOKINGS_URI.to_string(), "Bookings".to_string()));
        let resources: Vec<Resource> = entries
            .into_iter()
            .map(|(uri, name)| Resource {
                annotations: None,
                raw: RawResource {
                    uri,
                    name,
                    title: None,
                    description: None,
                    mime_type: Some("text/plain".into()),
                    size: None,
                    icons: None,
                    meta: None,
                },
            })
            .collect();
        Ok(ListResourcesResult {
            resources,
            next_cursor: None,
            meta: None,
        })
    }

    async fn list_resource_templates(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourceTemplatesResult, McpError> {
        let template = |uri_template: &str, name: &str, title: &str, description: &str| {
            ResourceTemplate {
                annotations: None,
                raw: RawResourceTemplate {
                    uri_template: uri_template.into(),
                    name: name.into(),
                    title: Some(title.into()),
                    description: Some(description.into()),
                    mime_type: Some("text/plain".into()),
                    icons: None,
                },
            }
        };
        Ok(ListResourceTemplatesResult {
            resource_templates: vec![
                template(
                    "homestay://listing/{id}",
                    "Homestay",
                    "Homestay details",
                    "Full homestay description (fetched via homestay_listing_details)",
                ),
                template(
                    "homestay://search/{query}",
                    "Search Results",
                    "Search results",
                    "Homestays matching a search (fetched via homestay_search)",
                ),
            ],
            next_cursor: None,
            meta: None,
        })
    }

    async fn read_resource(
        &self,
        request: ReadResourceRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, McpError> {
        if request.uri == BOOKINGS_URI {
            return Ok(ReadResourceResult {
                contents: vec![ResourceContents::text(self.render_bookings(), request.uri)],
            });
        }
        match self.resources.get(&request.uri).await {
            Some(entry) => Ok(ReadResourceResult {
                contents: vec![ResourceContents::text(entry.text, request.uri)],
            }),
            None => Err(McpError::resource_not_found(
                format!("resource not found: {}", request.uri),
                None,
            )),
        }
    }
}
