use log::{error, info, warn};
use mongodb::{
    bson::{self, doc, Document},
    Client, Collection,
};
use futures::StreamExt;

// Import the models we need
use crate::models::{
    AuthResponse, Booking, BookingStatus, Car, ChatMessage, Claims, Contact, CreateBookingRequest,
    CreateCarRequest, CreateContactRequest, CreateFeedbackRequest, CreateReviewRequest,
    CreateTripRequest, FaqEntry, Feedback, LoginRequest, PaymentStatus, PaymentTransaction,
    RegisterRequest, Review, Role, Trip, TransactionKind, UpdateProfileRequest, User, UserProfile,
    UserResponse, UserSession,
};
use crate::models::payment::WebhookEventData;

#[derive(Clone)]
pub struct MongoDB {
    client: Client,
    db_name: String,
}

impl MongoDB {
    pub async fn new(uri: &str, db_name: &str) -> Result<Self, mongodb::error::Error> {
        let client_options = mongodb::options::ClientOptions::parse(uri).await?;
        let client = Client::with_options(client_options)?;
        Ok(MongoDB {
            client,
            db_name: db_name.to_string(),
        })
    }

    fn get_users_collection(&self) -> Collection<Document> {
        self.client.database(&self.db_name).collection("users")
    }

    fn get_profiles_collection(&self) -> Collection<UserProfile> {
        self.client.database(&self.db_name).collection("profiles")
    }

    fn get_sessions_collection(&self) -> Collection<UserSession> {
        self.client.database(&self.db_name).collection("user_sessions")
    }

    fn get_bookings_collection(&self) -> Collection<Booking> {
        self.client.database(&self.db_name).collection("bookings")
    }

    fn get_trips_collection(&self) -> Collection<Trip> {
        self.client.database(&self.db_name).collection("trips")
    }

    fn get_cars_collection(&self) -> Collection<Car> {
        self.client.database(&self.db_name).collection("cars")
    }

    fn get_transactions_collection(&self) -> Collection<PaymentTransaction> {
        self.client.database(&self.db_name).collection("payment_transactions")
    }

    fn get_faq_collection(&self) -> Collection<FaqEntry> {
        self.client.database(&self.db_name).collection("faq_entries")
    }

    fn get_chat_collection(&self) -> Collection<ChatMessage> {
        self.client.database(&self.db_name).collection("chat_messages")
    }

    fn get_contacts_collection(&self) -> Collection<Contact> {
        self.client.database(&self.db_name).collection("contacts")
    }

    fn get_feedback_collection(&self) -> Collection<Feedback> {
        self.client.database(&self.db_name).collection("feedback")
    }

    fn get_reviews_collection(&self) -> Collection<Review> {
        self.client.database(&self.db_name).collection("reviews")
    }

    pub fn string_to_id(&self, id: &str) -> Result<bson::oid::ObjectId, mongodb::error::Error> {
        bson::oid::ObjectId::parse_str(id).map_err(|e| {
            mongodb::error::Error::from(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                e.to_string(),
            ))
        })
    }

    fn issue_token(&self, user_id: &bson::oid::ObjectId, role: Role) -> Result<String, Box<dyn std::error::Error>> {
        let expiration = chrono::Utc::now() + chrono::Duration::hours(24);
        let claims = Claims {
            sub: user_id.to_hex(),
            role,
            exp: expiration.timestamp() as usize,
        };

        let secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| "secret".to_string());
        let token = jsonwebtoken::encode(
            &jsonwebtoken::Header::default(),
            &claims,
            &jsonwebtoken::EncodingKey::from_secret(secret.as_ref()),
        )?;
        Ok(token)
    }

    // ---- users & auth ----

    pub async fn create_user(&self, user: &RegisterRequest) -> Result<AuthResponse, Box<dyn std::error::Error>> {
        let collection = self.get_users_collection();

        // Check if user already exists
        let existing_user = collection.find_one(doc! { "email": &user.email }, None).await?;
        if existing_user.is_some() {
            return Err("User already exists".into());
        }

        // Admin accounts are promoted by an existing admin, never self-registered.
        let role = match user.role.unwrap_or(Role::Customer) {
            Role::Admin => Role::Customer,
            other => other,
        };

        let hashed_password = bcrypt::hash(&user.password, bcrypt::DEFAULT_COST)?;

        let user_doc = doc! {
            "username": &user.username,
            "email": &user.email,
            "password": &hashed_password,
            "role": role.as_str(),
            "created_at": bson::DateTime::now(),
            "updated_at": bson::DateTime::now(),
        };

        let result = collection.insert_one(user_doc, None).await?;
        let user_id = result
            .inserted_id
            .as_object_id()
            .ok_or("Inserted user has no ObjectId")?;

        let token = self.issue_token(&user_id, role)?;

        Ok(AuthResponse {
            token,
            user: UserResponse {
                id: user_id.to_hex(),
                username: user.username.clone(),
                email: user.email.clone(),
                role,
            },
        })
    }

    pub async fn authenticate_user(&self, credentials: &LoginRequest) -> Result<AuthResponse, Box<dyn std::error::Error>> {
        let collection = self.get_users_collection();

        let user_doc = collection.find_one(doc! { "email": &credentials.email }, None).await?
            .ok_or("Invalid credentials")?;

        let user = bson::from_document::<User>(user_doc)?;

        if !bcrypt::verify(&credentials.password, &user.password).map_err(|e| {
            error!("Bcrypt verification error: {}", e);
            e
        })? {
            warn!("Invalid password attempt for email: {}", credentials.email);
            return Err("Invalid credentials".into());
        }

        let user_id = user.id.ok_or_else(|| {
            error!("User document found for {} but missing ID", credentials.email);
            "User ID not found"
        })?;

        let token = self.issue_token(&user_id, user.role)?;

        // Session bookkeeping for the presence read model.
        let session = UserSession {
            id: None,
            user_id,
            logged_in_at: bson::DateTime::now(),
            logged_out_at: None,
            is_active: true,
        };
        self.get_sessions_collection().insert_one(session, None).await?;

        info!("User {} authenticated successfully", user.email);
        Ok(AuthResponse {
            token,
            user: UserResponse {
                id: user_id.to_hex(),
                username: user.username,
                email: user.email,
                role: user.role,
            },
        })
    }

    pub async fn close_sessions(&self, user_id: &str) -> Result<u64, Box<dyn std::error::Error>> {
        let user_oid = self.string_to_id(user_id)?;
        let result = self.get_sessions_collection().update_many(
            doc! { "user_id": user_oid, "is_active": true },
            doc! { "$set": { "is_active": false, "logged_out_at": bson::DateTime::now() } },
            None,
        ).await?;
        Ok(result.modified_count)
    }

    pub async fn get_user(&self, user_id: &str) -> Result<Option<User>, Box<dyn std::error::Error>> {
        let user_oid = self.string_to_id(user_id)?;
        let user_doc = self.get_users_collection()
            .find_one(doc! { "_id": user_oid }, None)
            .await?;
        match user_doc {
            Some(d) => Ok(Some(bson::from_document::<User>(d)?)),
            None => Ok(None),
        }
    }

    pub async fn list_users(&self) -> Result<Vec<UserResponse>, Box<dyn std::error::Error>> {
        let mut cursor = self.get_users_collection().find(None, None).await?;
        let mut users = Vec::new();
        while let Some(result) = cursor.next().await {
            let user = bson::from_document::<User>(result?)?;
            if let Some(id) = user.id {
                users.push(UserResponse {
                    id: id.to_hex(),
                    username: user.username,
                    email: user.email,
                    role: user.role,
                });
            }
        }
        Ok(users)
    }

    pub async fn set_user_role(&self, user_id: &str, role: Role) -> Result<(), Box<dyn std::error::Error>> {
        let user_oid = self.string_to_id(user_id)?;
        let result = self.get_users_collection().update_one(
            doc! { "_id": user_oid },
            doc! { "$set": { "role": role.as_str(), "updated_at": bson::DateTime::now() } },
            None,
        ).await?;
        if result.matched_count == 0 {
            return Err("User not found".into());
        }
        Ok(())
    }

    pub async fn get_profile(&self, user_id: &str) -> Result<Option<UserProfile>, Box<dyn std::error::Error>> {
        let user_oid = self.string_to_id(user_id)?;
        Ok(self.get_profiles_collection()
            .find_one(doc! { "user_id": user_oid }, None)
            .await?)
    }

    pub async fn upsert_profile(&self, user_id: &str, req: &UpdateProfileRequest) -> Result<UserProfile, Box<dyn std::error::Error>> {
        let user_oid = self.string_to_id(user_id)?;
        let collection = self.get_profiles_collection();

        // user_id doubles as the upsert key and keeps $set non-empty.
        let mut set = doc! { "user_id": user_oid };
        if let Some(phone) = &req.phone {
            set.insert("phone", phone);
        }
        if let Some(address) = &req.address {
            set.insert("address", address);
        }
        if let Some(city) = &req.city {
            set.insert("city", city);
        }
        if let Some(bio) = &req.bio {
            set.insert("bio", bio);
        }

        let options = mongodb::options::UpdateOptions::builder().upsert(true).build();
        collection.update_one(
            doc! { "user_id": user_oid },
            doc! { "$set": set },
            options,
        ).await?;

        collection
            .find_one(doc! { "user_id": user_oid }, None)
            .await?
            .ok_or_else(|| "Profile not found after upsert".into())
    }

    pub async fn get_active_drivers(&self) -> Result<Vec<UserResponse>, Box<dyn std::error::Error>> {
        let mut cursor = self.get_sessions_collection()
            .find(doc! { "is_active": true }, None)
            .await?;

        let mut driver_ids = Vec::new();
        while let Some(result) = cursor.next().await {
            let session = result?;
            if !driver_ids.contains(&session.user_id) {
                driver_ids.push(session.user_id);
            }
        }

        let mut drivers = Vec::new();
        for id in driver_ids {
            let user_doc = self.get_users_collection()
                .find_one(doc! { "_id": id, "role": "driver" }, None)
                .await?;
            if let Some(d) = user_doc {
                let user = bson::from_document::<User>(d)?;
                drivers.push(UserResponse {
                    id: id.to_hex(),
                    username: user.username,
                    email: user.email,
                    role: user.role,
                });
            }
        }
        Ok(drivers)
    }

    // ---- ride bookings ----

    pub async fn create_booking(&self, user_id: &str, req: &CreateBookingRequest) -> Result<Booking, Box<dyn std::error::Error>> {
        let user_oid = self.string_to_id(user_id)?;

        if req.passengers < 1 {
            return Err("Booking needs at least one passenger".into());
        }

        let contact_email = match &req.contact_email {
            Some(email) => email.clone(),
            None => {
                let user = self.get_user(user_id).await?.ok_or("User not found")?;
                user.email
            }
        };

        let booking = Booking {
            id: None,
            user_id: user_oid,
            driver_id: None,
            car_id: None,
            pickup: req.pickup.clone(),
            dropoff: req.dropoff.clone(),
            ride_date: req.ride_date.clone(),
            passengers: req.passengers,
            fare: req.fare,
            status: BookingStatus::Pending,
            payment_status: PaymentStatus::Pending,
            payment_session_id: None,
            contact_email,
            created_at: bson::DateTime::now(),
            updated_at: bson::DateTime::now(),
            paid_at: None,
        };

        let collection = self.get_bookings_collection();
        let result = collection.insert_one(&booking, None).await?;
        let mut new_booking = booking;
        new_booking.id = result.inserted_id.as_object_id();
        Ok(new_booking)
    }

    pub async fn get_booking(&self, booking_id: &str) -> Result<Option<Booking>, Box<dyn std::error::Error>> {
        let booking_oid = self.string_to_id(booking_id)?;
        Ok(self.get_bookings_collection()
            .find_one(doc! { "_id": booking_oid }, None)
            .await?)
    }

    pub async fn get_user_bookings(&self, user_id: &str) -> Result<Vec<Booking>, Box<dyn std::error::Error>> {
        let user_oid = self.string_to_id(user_id)?;
        let mut cursor = self.get_bookings_collection()
            .find(doc! { "user_id": user_oid }, None)
            .await?;

        let mut bookings = Vec::new();
        while let Some(result) = cursor.next().await {
            bookings.push(result?);
        }
        Ok(bookings)
    }

    pub async fn get_all_bookings(&self) -> Result<Vec<Booking>, Box<dyn std::error::Error>> {
        let mut cursor = self.get_bookings_collection().find(None, None).await?;
        let mut bookings = Vec::new();
        while let Some(result) = cursor.next().await {
            bookings.push(result?);
        }
        Ok(bookings)
    }

    pub async fn assign_driver(&self, booking_id: &str, driver_id: &str, car_id: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
        let booking_oid = self.string_to_id(booking_id)?;
        let driver_oid = self.string_to_id(driver_id)?;

        let driver_doc = self.get_users_collection()
            .find_one(doc! { "_id": driver_oid, "role": "driver" }, None)
            .await?;
        if driver_doc.is_none() {
            return Err("Driver not found".into());
        }

        let mut set = doc! {
            "driver_id": driver_oid,
            "status": "assigned",
            "updated_at": bson::DateTime::now(),
        };
        if let Some(car_id) = car_id {
            let car_oid = self.string_to_id(car_id)?;
            let car = self.get_cars_collection()
                .find_one(doc! { "_id": car_oid }, None)
                .await?
                .ok_or("Car not found")?;
            if car.owner_id != driver_oid {
                return Err("Car does not belong to this driver".into());
            }
            set.insert("car_id", car_oid);
        }

        let result = self.get_bookings_collection().update_one(
            doc! { "_id": booking_oid },
            doc! { "$set": set },
            None,
        ).await?;
        if result.matched_count == 0 {
            return Err("Booking not found".into());
        }
        Ok(())
    }

    pub async fn update_booking_status(&self, booking_id: &str, actor: &Claims, status: BookingStatus) -> Result<(), Box<dyn std::error::Error>> {
        let booking_oid = self.string_to_id(booking_id)?;
        let collection = self.get_bookings_collection();

        let booking = collection
            .find_one(doc! { "_id": booking_oid }, None)
            .await?
            .ok_or("Booking not found")?;

        // Drivers may only touch rides assigned to them.
        if actor.role == Role::Driver {
            let actor_oid = self.string_to_id(&actor.sub)?;
            if booking.driver_id != Some(actor_oid) {
                return Err("Booking is not assigned to this driver".into());
            }
        }

        collection.update_one(
            doc! { "_id": booking_oid },
            doc! { "$set": { "status": bson::to_bson(&status)?, "updated_at": bson::DateTime::now() } },
            None,
        ).await?;
        Ok(())
    }

    pub async fn cancel_booking(&self, booking_id: &str, user_id: &str) -> Result<(), Box<dyn std::error::Error>> {
        let booking_oid = self.string_to_id(booking_id)?;
        let user_oid = self.string_to_id(user_id)?;
        let collection = self.get_bookings_collection();

        let booking = collection.find_one(
            doc! { "_id": booking_oid, "user_id": user_oid },
            None,
        ).await?;
        if booking.is_none() {
            return Err("Booking not found".into());
        }

        collection.update_one(
            doc! { "_id": booking_oid },
            doc! { "$set": { "status": "cancelled", "updated_at": bson::DateTime::now() } },
            None,
        ).await?;
        Ok(())
    }

    // ---- tour trips ----

    pub async fn create_trip(&self, user_id: &str, req: &CreateTripRequest) -> Result<Trip, Box<dyn std::error::Error>> {
        let user_oid = self.string_to_id(user_id)?;

        if req.guests < 1 {
            return Err("Trip needs at least one guest".into());
        }

        let contact_email = match &req.contact_email {
            Some(email) => email.clone(),
            None => {
                let user = self.get_user(user_id).await?.ok_or("User not found")?;
                user.email
            }
        };

        let trip = Trip {
            id: None,
            user_id: user_oid,
            tour_name: req.tour_name.clone(),
            start_date: req.start_date.clone(),
            guests: req.guests,
            total_price: req.total_price,
            status: BookingStatus::Pending,
            payment_status: PaymentStatus::Pending,
            payment_session_id: None,
            contact_email,
            created_at: bson::DateTime::now(),
            updated_at: bson::DateTime::now(),
            paid_at: None,
        };

        let result = self.get_trips_collection().insert_one(&trip, None).await?;
        let mut new_trip = trip;
        new_trip.id = result.inserted_id.as_object_id();
        Ok(new_trip)
    }

    pub async fn get_trip(&self, trip_id: &str) -> Result<Option<Trip>, Box<dyn std::error::Error>> {
        let trip_oid = self.string_to_id(trip_id)?;
        Ok(self.get_trips_collection()
            .find_one(doc! { "_id": trip_oid }, None)
            .await?)
    }

    pub async fn get_user_trips(&self, user_id: &str) -> Result<Vec<Trip>, Box<dyn std::error::Error>> {
        let user_oid = self.string_to_id(user_id)?;
        let mut cursor = self.get_trips_collection()
            .find(doc! { "user_id": user_oid }, None)
            .await?;
        let mut trips = Vec::new();
        while let Some(result) = cursor.next().await {
            trips.push(result?);
        }
        Ok(trips)
    }

    pub async fn get_all_trips(&self) -> Result<Vec<Trip>, Box<dyn std::error::Error>> {
        let mut cursor = self.get_trips_collection().find(None, None).await?;
        let mut trips = Vec::new();
        while let Some(result) = cursor.next().await {
            trips.push(result?);
        }
        Ok(trips)
    }

    pub async fn update_trip_status(&self, trip_id: &str, status: BookingStatus) -> Result<(), Box<dyn std::error::Error>> {
        let trip_oid = self.string_to_id(trip_id)?;
        let result = self.get_trips_collection().update_one(
            doc! { "_id": trip_oid },
            doc! { "$set": { "status": bson::to_bson(&status)?, "updated_at": bson::DateTime::now() } },
            None,
        ).await?;
        if result.matched_count == 0 {
            return Err("Trip not found".into());
        }
        Ok(())
    }

    pub async fn cancel_trip(&self, trip_id: &str, user_id: &str) -> Result<(), Box<dyn std::error::Error>> {
        let trip_oid = self.string_to_id(trip_id)?;
        let user_oid = self.string_to_id(user_id)?;
        let collection = self.get_trips_collection();

        let trip = collection.find_one(
            doc! { "_id": trip_oid, "user_id": user_oid },
            None,
        ).await?;
        if trip.is_none() {
            return Err("Trip not found".into());
        }

        collection.update_one(
            doc! { "_id": trip_oid },
            doc! { "$set": { "status": "cancelled", "updated_at": bson::DateTime::now() } },
            None,
        ).await?;
        Ok(())
    }

    // ---- cars ----

    pub async fn create_car(&self, owner_id: &str, req: &CreateCarRequest) -> Result<Car, Box<dyn std::error::Error>> {
        let owner_oid = self.string_to_id(owner_id)?;

        let existing = self.get_cars_collection()
            .find_one(doc! { "plate": &req.plate }, None)
            .await?;
        if existing.is_some() {
            return Err("A car with this plate is already registered".into());
        }

        let car = Car {
            id: None,
            owner_id: owner_oid,
            model: req.model.clone(),
            plate: req.plate.clone(),
            seats: req.seats,
            rate_per_km: req.rate_per_km,
            location: req.location.clone(),
            available: true,
            verified: false,
            created_at: bson::DateTime::now(),
        };

        let result = self.get_cars_collection().insert_one(&car, None).await?;
        let mut new_car = car;
        new_car.id = result.inserted_id.as_object_id();
        Ok(new_car)
    }

    pub async fn get_available_cars(&self) -> Result<Vec<Car>, Box<dyn std::error::Error>> {
        let mut cursor = self.get_cars_collection()
            .find(doc! { "available": true, "verified": true }, None)
            .await?;
        let mut cars = Vec::new();
        while let Some(result) = cursor.next().await {
            cars.push(result?);
        }
        Ok(cars)
    }

    pub async fn get_owner_cars(&self, owner_id: &str) -> Result<Vec<Car>, Box<dyn std::error::Error>> {
        let owner_oid = self.string_to_id(owner_id)?;
        let mut cursor = self.get_cars_collection()
            .find(doc! { "owner_id": owner_oid }, None)
            .await?;
        let mut cars = Vec::new();
        while let Some(result) = cursor.next().await {
            cars.push(result?);
        }
        Ok(cars)
    }

    pub async fn get_car(&self, car_id: &str) -> Result<Option<Car>, Box<dyn std::error::Error>> {
        let car_oid = self.string_to_id(car_id)?;
        Ok(self.get_cars_collection()
            .find_one(doc! { "_id": car_oid }, None)
            .await?)
    }

    pub async fn verify_car(&self, car_id: &str) -> Result<(), Box<dyn std::error::Error>> {
        let car_oid = self.string_to_id(car_id)?;
        let result = self.get_cars_collection().update_one(
            doc! { "_id": car_oid },
            doc! { "$set": { "verified": true } },
            None,
        ).await?;
        if result.matched_count == 0 {
            return Err("Car not found".into());
        }
        Ok(())
    }

    pub async fn delete_car(&self, car_id: &str, actor: &Claims) -> Result<(), Box<dyn std::error::Error>> {
        let car_oid = self.string_to_id(car_id)?;
        let collection = self.get_cars_collection();

        let car = collection
            .find_one(doc! { "_id": car_oid }, None)
            .await?
            .ok_or("Car not found")?;

        if actor.role != Role::Admin {
            let actor_oid = self.string_to_id(&actor.sub)?;
            if car.owner_id != actor_oid {
                return Err("Car does not belong to this user".into());
            }
        }

        collection.delete_one(doc! { "_id": car_oid }, None).await?;
        Ok(())
    }

    // ---- payments ----

    pub async fn set_booking_session(&self, booking_id: &str, session_id: &str) -> Result<(), Box<dyn std::error::Error>> {
        let booking_oid = self.string_to_id(booking_id)?;
        self.get_bookings_collection().update_one(
            doc! { "_id": booking_oid },
            doc! { "$set": { "payment_session_id": session_id, "updated_at": bson::DateTime::now() } },
            None,
        ).await?;
        Ok(())
    }

    pub async fn set_trip_session(&self, trip_id: &str, session_id: &str) -> Result<(), Box<dyn std::error::Error>> {
        let trip_oid = self.string_to_id(trip_id)?;
        self.get_trips_collection().update_one(
            doc! { "_id": trip_oid },
            doc! { "$set": { "payment_session_id": session_id, "updated_at": bson::DateTime::now() } },
            None,
        ).await?;
        Ok(())
    }

    /// Reconciles a completed-checkout event against a pending booking or
    /// trip: session reference first, then customer email. The matched
    /// record is marked paid and a transaction is recorded; an event that
    /// matches nothing still produces an orphan transaction built from the
    /// webhook metadata. The record update and the transaction insert are
    /// two separate writes.
    pub async fn reconcile_checkout(&self, data: &WebhookEventData) -> Result<PaymentTransaction, Box<dyn std::error::Error>> {
        let bookings = self.get_bookings_collection();
        let trips = self.get_trips_collection();

        let mut booking_id = None;
        let mut trip_id = None;

        for (target, filter) in checkout_match_queries(data) {
            match target {
                MatchTarget::Booking => {
                    if let Some(booking) = bookings.find_one(filter, None).await? {
                        let oid = booking.id.ok_or("Matched booking has no ID")?;
                        bookings.update_one(doc! { "_id": oid }, paid_update_for(target), None).await?;
                        booking_id = Some(oid);
                        info!("Payment session {} reconciled to booking {}", data.session_id, oid.to_hex());
                        break;
                    }
                }
                MatchTarget::Trip => {
                    if let Some(trip) = trips.find_one(filter, None).await? {
                        let oid = trip.id.ok_or("Matched trip has no ID")?;
                        trips.update_one(doc! { "_id": oid }, paid_update_for(target), None).await?;
                        trip_id = Some(oid);
                        info!("Payment session {} reconciled to trip {}", data.session_id, oid.to_hex());
                        break;
                    }
                }
            }
        }

        if booking_id.is_none() && trip_id.is_none() {
            warn!("Payment session {} matched no pending booking or trip", data.session_id);
        }

        let transaction = PaymentTransaction {
            id: None,
            reference: data.session_id.clone(),
            amount: data.amount,
            currency: data.currency.clone(),
            customer_email: data.customer_email.clone(),
            kind: TransactionKind::Payment,
            booking_id,
            trip_id,
            created_at: bson::DateTime::now(),
        };

        let result = self.get_transactions_collection().insert_one(&transaction, None).await?;
        let mut new_transaction = transaction;
        new_transaction.id = result.inserted_id.as_object_id();
        Ok(new_transaction)
    }

    /// Marks the paid record behind a refunded session as refunded and
    /// records a refund transaction.
    pub async fn reconcile_refund(&self, data: &WebhookEventData) -> Result<PaymentTransaction, Box<dyn std::error::Error>> {
        let bookings = self.get_bookings_collection();
        let trips = self.get_trips_collection();

        let refund_update = doc! { "$set": {
            "payment_status": "refunded",
            "status": "cancelled",
            "updated_at": bson::DateTime::now(),
        }};

        let mut booking_id = None;
        let mut trip_id = None;

        if let Some(booking) = bookings.find_one(
            doc! { "payment_session_id": &data.session_id, "payment_status": "paid" },
            None,
        ).await? {
            let oid = booking.id.ok_or("Matched booking has no ID")?;
            bookings.update_one(doc! { "_id": oid }, refund_update, None).await?;
            booking_id = Some(oid);
        } else if let Some(trip) = trips.find_one(
            doc! { "payment_session_id": &data.session_id, "payment_status": "paid" },
            None,
        ).await? {
            let oid = trip.id.ok_or("Matched trip has no ID")?;
            trips.update_one(doc! { "_id": oid }, refund_update, None).await?;
            trip_id = Some(oid);
        } else {
            warn!("Refund for session {} matched no paid record", data.session_id);
        }

        let transaction = PaymentTransaction {
            id: None,
            reference: data.session_id.clone(),
            amount: data.amount,
            currency: data.currency.clone(),
            customer_email: data.customer_email.clone(),
            kind: TransactionKind::Refund,
            booking_id,
            trip_id,
            created_at: bson::DateTime::now(),
        };

        let result = self.get_transactions_collection().insert_one(&transaction, None).await?;
        let mut new_transaction = transaction;
        new_transaction.id = result.inserted_id.as_object_id();
        Ok(new_transaction)
    }

    pub async fn get_transactions_for(&self, user_id: &str, email: &str) -> Result<Vec<PaymentTransaction>, Box<dyn std::error::Error>> {
        // A booking can be paid under a contact email that differs from the
        // account email, so linked records are matched by id as well.
        let booking_ids: Vec<_> = self.get_user_bookings(user_id).await?
            .into_iter()
            .filter_map(|b| b.id)
            .collect();
        let trip_ids: Vec<_> = self.get_user_trips(user_id).await?
            .into_iter()
            .filter_map(|t| t.id)
            .collect();

        let mut cursor = self.get_transactions_collection()
            .find(transactions_filter(email, booking_ids, trip_ids), None)
            .await?;
        let mut transactions = Vec::new();
        while let Some(result) = cursor.next().await {
            transactions.push(result?);
        }
        Ok(transactions)
    }

    pub async fn get_all_transactions(&self) -> Result<Vec<PaymentTransaction>, Box<dyn std::error::Error>> {
        let mut cursor = self.get_transactions_collection().find(None, None).await?;
        let mut transactions = Vec::new();
        while let Some(result) = cursor.next().await {
            transactions.push(result?);
        }
        Ok(transactions)
    }

    // ---- chatbot ----

    pub async fn get_faq_entries(&self) -> Result<Vec<FaqEntry>, Box<dyn std::error::Error>> {
        let mut cursor = self.get_faq_collection().find(None, None).await?;
        let mut entries = Vec::new();
        while let Some(result) = cursor.next().await {
            entries.push(result?);
        }
        Ok(entries)
    }

    pub async fn insert_chat_message(&self, message: ChatMessage) -> Result<(), Box<dyn std::error::Error>> {
        self.get_chat_collection().insert_one(message, None).await?;
        Ok(())
    }

    pub async fn get_chat_history(&self, user_id: &str) -> Result<Vec<ChatMessage>, Box<dyn std::error::Error>> {
        let user_oid = self.string_to_id(user_id)?;
        let mut cursor = self.get_chat_collection()
            .find(doc! { "user_id": user_oid }, None)
            .await?;
        let mut messages = Vec::new();
        while let Some(result) = cursor.next().await {
            messages.push(result?);
        }
        Ok(messages)
    }

    // ---- contact, feedback, reviews ----

    pub async fn create_contact(&self, req: &CreateContactRequest) -> Result<Contact, Box<dyn std::error::Error>> {
        let contact = Contact {
            id: None,
            name: req.name.clone(),
            email: req.email.clone(),
            subject: req.subject.clone(),
            message: req.message.clone(),
            created_at: bson::DateTime::now(),
        };
        let result = self.get_contacts_collection().insert_one(&contact, None).await?;
        let mut new_contact = contact;
        new_contact.id = result.inserted_id.as_object_id();
        Ok(new_contact)
    }

    pub async fn create_feedback(&self, user_id: Option<&str>, req: &CreateFeedbackRequest) -> Result<Feedback, Box<dyn std::error::Error>> {
        let user_oid = match user_id {
            Some(id) => Some(self.string_to_id(id)?),
            None => None,
        };
        let feedback = Feedback {
            id: None,
            user_id: user_oid,
            message: req.message.clone(),
            created_at: bson::DateTime::now(),
        };
        let result = self.get_feedback_collection().insert_one(&feedback, None).await?;
        let mut new_feedback = feedback;
        new_feedback.id = result.inserted_id.as_object_id();
        Ok(new_feedback)
    }

    pub async fn list_feedback(&self) -> Result<Vec<Feedback>, Box<dyn std::error::Error>> {
        let mut cursor = self.get_feedback_collection().find(None, None).await?;
        let mut entries = Vec::new();
        while let Some(result) = cursor.next().await {
            entries.push(result?);
        }
        Ok(entries)
    }

    pub async fn create_review(&self, user_id: &str, req: &CreateReviewRequest) -> Result<Review, Box<dyn std::error::Error>> {
        if !(1..=5).contains(&req.rating) {
            return Err("Rating must be between 1 and 5".into());
        }

        let user_oid = self.string_to_id(user_id)?;
        let driver_oid = self.string_to_id(&req.driver_id)?;

        let driver_doc = self.get_users_collection()
            .find_one(doc! { "_id": driver_oid, "role": "driver" }, None)
            .await?;
        if driver_doc.is_none() {
            return Err("Driver not found".into());
        }

        let review = Review {
            id: None,
            user_id: user_oid,
            driver_id: driver_oid,
            rating: req.rating,
            comment: req.comment.clone(),
            created_at: bson::DateTime::now(),
        };
        let result = self.get_reviews_collection().insert_one(&review, None).await?;
        let mut new_review = review;
        new_review.id = result.inserted_id.as_object_id();
        Ok(new_review)
    }

    pub async fn get_driver_reviews(&self, driver_id: &str) -> Result<Vec<Review>, Box<dyn std::error::Error>> {
        let driver_oid = self.string_to_id(driver_id)?;
        let mut cursor = self.get_reviews_collection()
            .find(doc! { "driver_id": driver_oid }, None)
            .await?;
        let mut reviews = Vec::new();
        while let Some(result) = cursor.next().await {
            reviews.push(result?);
        }
        Ok(reviews)
    }

    // ---- seeding ----

    pub async fn seed_data(&self) -> Result<(), Box<dyn std::error::Error>> {
        let collection = self.get_faq_collection();

        // Force seed if env var is set
        let force_seed = std::env::var("FORCE_SEED").unwrap_or_else(|_| "false".to_string()) == "true";

        if force_seed {
            info!("Force seeding enabled. Clearing FAQ collection...");
            collection.delete_many(doc! {}, None).await?;
        }

        let count = collection.count_documents(None, None).await?;

        if count == 0 {
            info!("Seeding FAQ entries...");
            let entries = vec![
                FaqEntry {
                    id: None,
                    question: "How do I book a ride?".to_string(),
                    answer: "Sign in, open Bookings, pick your pickup and dropoff points and confirm the fare.".to_string(),
                },
                FaqEntry {
                    id: None,
                    question: "How do I cancel a booking?".to_string(),
                    answer: "Open My Bookings and press cancel on the ride. Paid rides are refunded through the payment provider.".to_string(),
                },
                FaqEntry {
                    id: None,
                    question: "How do I pay for a ride or tour?".to_string(),
                    answer: "Create a payment session from the booking page; you will be redirected to our payment provider's checkout.".to_string(),
                },
                FaqEntry {
                    id: None,
                    question: "When will I get my refund?".to_string(),
                    answer: "Refunds are issued by the payment provider and usually land within 5-7 business days.".to_string(),
                },
                FaqEntry {
                    id: None,
                    question: "How do I become a driver?".to_string(),
                    answer: "Register with the driver role and add your car. An admin verifies the car before it is listed.".to_string(),
                },
                FaqEntry {
                    id: None,
                    question: "Can I book a tour package for a group?".to_string(),
                    answer: "Yes, set the guest count when booking the tour. The total price covers the whole group.".to_string(),
                },
                FaqEntry {
                    id: None,
                    question: "How do I contact support?".to_string(),
                    answer: "Use the contact form; the team replies to the email address you provide.".to_string(),
                },
            ];

            let seeded = entries.len();
            for entry in entries {
                collection.insert_one(entry, None).await?;
            }
            info!("Seeding complete with {} FAQ entries", seeded);
        }
        Ok(())
    }
}

#[derive(Clone, Copy, PartialEq, Debug)]
enum MatchTarget {
    Booking,
    Trip,
}

// Ordered match plan for a completed checkout: an exact session-reference
// match on either collection outranks the email heuristic, bookings before
// trips within each tier. Only pending records are considered.
fn checkout_match_queries(data: &WebhookEventData) -> Vec<(MatchTarget, Document)> {
    vec![
        (
            MatchTarget::Booking,
            doc! { "payment_session_id": &data.session_id, "payment_status": "pending" },
        ),
        (
            MatchTarget::Trip,
            doc! { "payment_session_id": &data.session_id, "payment_status": "pending" },
        ),
        (
            MatchTarget::Booking,
            doc! { "contact_email": &data.customer_email, "payment_status": "pending" },
        ),
        (
            MatchTarget::Trip,
            doc! { "contact_email": &data.customer_email, "payment_status": "pending" },
        ),
    ]
}

// A paid booking is also confirmed; a paid trip keeps its ride status and
// only gets its payment fields stamped.
fn paid_update_for(target: MatchTarget) -> Document {
    let mut set = doc! {
        "payment_status": "paid",
        "paid_at": bson::DateTime::now(),
        "updated_at": bson::DateTime::now(),
    };
    if target == MatchTarget::Booking {
        set.insert("status", "confirmed");
    }
    doc! { "$set": set }
}

// Transactions belong to a caller when they carry the caller's email or
// link to one of the caller's bookings or trips.
fn transactions_filter(
    email: &str,
    booking_ids: Vec<bson::oid::ObjectId>,
    trip_ids: Vec<bson::oid::ObjectId>,
) -> Document {
    doc! { "$or": [
        { "customer_email": email },
        { "booking_id": { "$in": booking_ids } },
        { "trip_id": { "$in": trip_ids } },
    ]}
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event() -> WebhookEventData {
        WebhookEventData {
            session_id: "cs_test_123".to_string(),
            amount: 1450.0,
            currency: "usd".to_string(),
            customer_email: "rider@example.com".to_string(),
        }
    }

    #[test]
    fn session_reference_matches_outrank_email_matches() {
        let queries = checkout_match_queries(&event());
        assert_eq!(queries.len(), 4);

        // A trip holding the session reference must win over a booking that
        // merely shares the customer email.
        assert_eq!(queries[1].0, MatchTarget::Trip);
        assert!(queries[1].1.contains_key("payment_session_id"));
        assert_eq!(queries[2].0, MatchTarget::Booking);
        assert!(queries[2].1.contains_key("contact_email"));

        // Both tiers only consider pending records.
        for (_, filter) in &queries {
            assert_eq!(filter.get_str("payment_status").unwrap(), "pending");
        }
    }

    #[test]
    fn checkout_confirms_bookings_but_not_trips() {
        let update = paid_update_for(MatchTarget::Booking);
        let set = update.get_document("$set").unwrap();
        assert_eq!(set.get_str("payment_status").unwrap(), "paid");
        assert_eq!(set.get_str("status").unwrap(), "confirmed");
        assert!(set.contains_key("paid_at"));

        let update = paid_update_for(MatchTarget::Trip);
        let set = update.get_document("$set").unwrap();
        assert_eq!(set.get_str("payment_status").unwrap(), "paid");
        assert!(!set.contains_key("status"));
        assert!(set.contains_key("paid_at"));
    }

    #[test]
    fn transactions_filter_covers_email_and_linked_records() {
        let booking_oid = bson::oid::ObjectId::new();
        let filter = transactions_filter("rider@example.com", vec![booking_oid], vec![]);
        let branches = filter.get_array("$or").unwrap();
        assert_eq!(branches.len(), 3);

        let email_branch = branches[0].as_document().unwrap();
        assert_eq!(email_branch.get_str("customer_email").unwrap(), "rider@example.com");

        let booking_branch = branches[1].as_document().unwrap();
        let ids = booking_branch
            .get_document("booking_id")
            .unwrap()
            .get_array("$in")
            .unwrap();
        assert_eq!(ids[0].as_object_id().unwrap(), booking_oid);
    }
}
