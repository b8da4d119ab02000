//! 预导入模块，方便使用

pub use super::classes::{ActiveModel as ClassActiveModel, Entity as Classes, Model as ClassModel};
pub use super::comment_reviews::{
    ActiveModel as CommentReviewActiveModel, Entity as CommentReviews, Model as CommentReviewModel,
};
pub use super::grade_compositions::{
    ActiveModel as GradeCompositionActiveModel, Entity as GradeCompositions,
    Model as GradeCompositionModel,
};
pub use super::notifications::{
    ActiveModel as NotificationActiveModel, Entity as Notifications, Model as NotificationModel,
};
pub use super::review_compositions::{
    ActiveModel as ReviewCompositionActiveModel, Entity as ReviewCompositions,
    Model as ReviewCompositionModel,
};
pub use super::student_compositions::{
    ActiveModel as StudentCompositionActiveModel, Entity as StudentCompositions,
    Model as StudentCompositionModel,
};
pub use super::user_classes::{
    ActiveModel as UserClassActiveModel, Entity as UserClasses, Model as UserClassModel,
};
pub use super::users::{ActiveModel as UserActiveModel, Entity as Users, Model as UserModel};
