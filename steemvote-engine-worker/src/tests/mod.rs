// Copyright (c) 2022 THE STEEMVOTE AUTHORS

mod tools;
