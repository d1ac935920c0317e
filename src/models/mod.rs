pub mod auth;
pub mod booking;
pub mod car;
pub mod chat;
pub mod contact;
pub mod payment;
pub mod trip;
pub mod user;

// Re-export all the models that are used in other modules
pub use auth::{AuthResponse, LoginRequest, RegisterRequest};
pub use booking::{AssignDriverRequest, Booking, BookingStatus, CreateBookingRequest, UpdateStatusRequest};
pub use car::{Car, CarResponse, CreateCarRequest};
pub use chat::{ChatMessage, ChatReply, ChatRequest, FaqEntry};
pub use contact::{Contact, CreateContactRequest, CreateFeedbackRequest, CreateReviewRequest, Feedback, Review};
pub use payment::{CreateSessionRequest, PaymentStatus, PaymentTransaction, SessionResponse, TransactionKind, WebhookEvent};
pub use trip::{CreateTripRequest, Trip};
pub use user::{Claims, Role, UpdateProfileRequest, UpdateRoleRequest, User, UserProfile, UserResponse, UserSession};
